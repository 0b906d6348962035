//! Pairwise core-to-core measurements: ping-pong latency and concurrent
//! arithmetic throughput, written out as square CSV matrices.

pub mod affinity;
pub mod bandwidth;
pub mod config;
pub mod driver;
pub mod error;
pub mod flag;
pub mod latency;
pub mod logging;
pub mod matrix;
pub mod output;
pub mod timer;
pub mod topology;

pub use bandwidth::measure_bandwidth;
pub use config::{Config, ProbeKind};
pub use error::{AffinityError, Error, Result};
pub use latency::measure_latency;
pub use matrix::ResultMatrix;
