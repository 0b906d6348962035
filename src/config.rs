use std::path::PathBuf;
use std::time::Duration;

pub const HANDSHAKE_ITERATIONS: u64 = 1_000_000;
pub const BANDWIDTH_WINDOW: Duration = Duration::from_millis(500);
pub const WORKLOAD_BLOCK: u64 = 1000;

/// Measurement parameters. The binaries always run with [`Config::default`];
/// the setters exist so tests and benches can shrink a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub handshake_iterations: u64,
    pub bandwidth_window: Duration,
    pub workload_block: u64,
    /// `None` means detect from the host.
    pub core_count: Option<usize>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handshake_iterations: HANDSHAKE_ITERATIONS,
            bandwidth_window: BANDWIDTH_WINDOW,
            workload_block: WORKLOAD_BLOCK,
            core_count: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn with_handshake_iterations(mut self, iterations: u64) -> Self {
        self.handshake_iterations = iterations;
        self
    }

    pub fn with_bandwidth_window(mut self, window: Duration) -> Self {
        self.bandwidth_window = window;
        self
    }

    pub fn with_workload_block(mut self, block: u64) -> Self {
        self.workload_block = block;
        self
    }

    pub fn with_core_count(mut self, cores: usize) -> Self {
        self.core_count = Some(cores);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Which matrix a run produces, and how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Latency,
    Bandwidth,
}

impl ProbeKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ProbeKind::Latency => "core_latencies.csv",
            ProbeKind::Bandwidth => "core_bandwidth.csv",
        }
    }

    /// Decimal places for off-diagonal cells.
    pub fn precision(self) -> usize {
        match self {
            ProbeKind::Latency => 3,
            ProbeKind::Bandwidth => 2,
        }
    }

    pub fn diagonal(self) -> &'static str {
        match self {
            ProbeKind::Latency => "0.000",
            ProbeKind::Bandwidth => "0",
        }
    }

    pub fn completion_message(self) -> String {
        match self {
            ProbeKind::Latency => format!("Latencies written to {}", self.file_name()),
            ProbeKind::Bandwidth => format!("Bandwidth results written to {}", self.file_name()),
        }
    }
}
