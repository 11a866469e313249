use jobintel_db::DbError;
use jobintel_sources::RegistryError;
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-payload and per-source problems never surface here; they are recorded
/// as run warnings instead. This type is for request-level failures (unknown
/// source names) and storage failures.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to serialize raw payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a single payload could not be normalized into a job.
///
/// These are recorded as run warnings; the payload is skipped and the run
/// continues.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("payload has no URL")]
    MissingUrl,
    #[error("payload has no title")]
    MissingTitle,
}
