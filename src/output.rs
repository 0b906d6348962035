use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::ProbeKind;
use crate::error::{Error, Result};
use crate::matrix::ResultMatrix;

/// Comma-separated table with a `CPU` header row and a core-index first
/// column.
pub struct TableWriter<W: Write> {
    out: W,
    path: PathBuf,
}

impl TableWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| Error::CreateOutput {
            path: path.clone(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W, path: impl Into<PathBuf>) -> Self {
        Self {
            out,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_matrix(&mut self, matrix: &ResultMatrix, kind: ProbeKind) -> Result<()> {
        let mut header = String::from("CPU");
        for cpu in 0..matrix.size() {
            header.push(',');
            header.push_str(&cpu.to_string());
        }
        self.write_line(&header)?;

        for (from, row) in matrix.rows().enumerate() {
            let mut line = from.to_string();
            for (to, value) in row.iter().enumerate() {
                line.push(',');
                if from == to {
                    line.push_str(kind.diagonal());
                } else {
                    line.push_str(&format!("{:.*}", kind.precision(), value));
                }
            }
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Flushes and hands back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush().map_err(|source| Error::WriteOutput {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.out)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}").map_err(|source| Error::WriteOutput {
            path: self.path.clone(),
            source,
        })
    }
}
