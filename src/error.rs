use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open {path} for writing: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read topology entry {path}: {source}")]
    ReadTopology {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reasons a thread could not be confined to the requested core.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AffinityError {
    #[error("the OS rejected pinning the current thread to core {core}")]
    Rejected { core: usize },
    #[error("thread pinned to core {requested} but is running on core {observed}")]
    Migrated { requested: usize, observed: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
