use std::path::PathBuf;

use tracing::info;

use crate::affinity::detect_core_count;
use crate::bandwidth::measure_bandwidth;
use crate::config::{Config, ProbeKind};
use crate::error::Result;
use crate::latency::measure_latency;
use crate::matrix::ResultMatrix;
use crate::output::TableWriter;

/// Full run for one probe kind: report the core count, open the output file
/// before measuring anything, fill the matrix pair by pair and write it out.
///
/// Returns the path that was written.
pub fn run(kind: ProbeKind, config: &Config) -> Result<PathBuf> {
    let cores = config.core_count.unwrap_or_else(detect_core_count);
    println!("Number of CPUs: {cores}");

    let path = config.output_dir.join(kind.file_name());
    let mut writer = TableWriter::create(&path)?;
    info!(path = %writer.path().display(), cores, ?kind, "measuring core pairs");

    let matrix = measure_matrix(kind, cores, config);
    writer.write_matrix(&matrix, kind)?;
    writer.finish()?;

    info!(path = %path.display(), "results written");
    println!("{}", kind.completion_message());
    Ok(path)
}

/// Runs the probe for every ordered pair of distinct cores, sequentially.
pub fn measure_matrix(kind: ProbeKind, cores: usize, config: &Config) -> ResultMatrix {
    match kind {
        ProbeKind::Latency => {
            // Stored in nanoseconds.
            ResultMatrix::measure(cores, |from, to| measure_latency(from, to, config) * 1e9)
        }
        ProbeKind::Bandwidth => {
            ResultMatrix::measure(cores, |from, to| measure_bandwidth(from, to, config))
        }
    }
}
