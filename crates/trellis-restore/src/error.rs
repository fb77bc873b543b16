use std::path::PathBuf;

use thiserror::Error;

use trellis_gardener::error::GardenApiError;

/// Baseline comparison failures. A regression means the remote object or
/// the snapshot can no longer be trusted; nothing is inferred from it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriftError {
    #[error(
        "remote generation {current} is behind the recorded baseline {original}; \
         the object was recreated or the snapshot is corrupt"
    )]
    GenerationRegression { original: i64, current: i64 },
}

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backup document {path:?} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Api(#[from] GardenApiError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error("failed to serialize results: {0}")]
    Report(#[from] serde_json::Error),
}
