use std::io;
use std::path::PathBuf;

use crate::membership::Side;

/// Failures while validating or loading the two input files. Any of these
/// aborts the whole comparison.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("{side} not found: {}", .path.display())]
    NotFound { side: Side, path: PathBuf },
    #[error("failed to open file {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to map file {}: {source}", .path.display())]
    Map { path: PathBuf, source: io::Error },
    #[error("failed to read file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
