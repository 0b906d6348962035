//! Logical-to-physical CPU mapping as exposed by Linux sysfs.
//!
//! Each `cpu<N>/topology` directory under `/sys/devices/system/cpu` carries a
//! `core_id` and a `physical_package_id`. CPUs missing either file are
//! skipped. On hosts without that tree the listing is simply empty.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const SYSFS_CPU_ROOT: &str = "/sys/devices/system/cpu";
pub const TOPOLOGY_FILE: &str = "cpu_topology.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTopology {
    pub cpu: usize,
    pub core_id: i64,
    pub package_id: i64,
}

/// Reads every `cpu<N>` entry under `root`, ordered by core id and then by
/// cpu index.
pub fn read_topology(root: &Path) -> Result<Vec<CpuTopology>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(Error::ReadTopology {
                path: root.to_path_buf(),
                source,
            })
        }
    };

    let mut cpus = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::ReadTopology {
            path: root.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(cpu) = name.to_str().and_then(parse_cpu_dir) else {
            continue;
        };

        let dir = entry.path().join("topology");
        let Some(core_id) = read_id(&dir.join("core_id"))? else {
            continue;
        };
        let Some(package_id) = read_id(&dir.join("physical_package_id"))? else {
            continue;
        };
        cpus.push(CpuTopology {
            cpu,
            core_id,
            package_id,
        });
    }

    cpus.sort_by_key(|entry| (entry.core_id, entry.cpu));
    Ok(cpus)
}

fn parse_cpu_dir(name: &str) -> Option<usize> {
    let digits = name.strip_prefix("cpu")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `Ok(None)` when the file does not exist.
fn read_id(path: &Path) -> Result<Option<i64>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::ReadTopology {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err| Error::ReadTopology {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })
}

/// Fixed-width console table.
pub fn render_table(cpus: &[CpuTopology]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:<10} {:<20}", "CPU", "Core ID", "Physical Package ID");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for entry in cpus {
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:<20}",
            format!("cpu{}", entry.cpu),
            entry.core_id,
            entry.package_id
        );
    }
    out
}

pub fn write_csv(path: &Path, cpus: &[CpuTopology]) -> Result<PathBuf> {
    let file = fs::File::create(path).map_err(|source| Error::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    let write_err = |source: io::Error| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    writeln!(out, "cpu,core_id,physical_package_id").map_err(write_err)?;
    for entry in cpus {
        writeln!(out, "cpu{},{},{}", entry.cpu, entry.core_id, entry.package_id)
            .map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;
    Ok(path.to_path_buf())
}
