//! Raw ingestion stage: persist every fetched payload before any
//! transformation touches it.

use jobintel_core::RawJobPayload;
use jobintel_db::{insert_raw_job_if_new, RawJobRow};
use sqlx::PgPool;

use crate::error::EtlError;

/// Stores a raw payload in the immutable ingestion log, deduplicated by
/// content hash.
///
/// Returns the row plus `true` if this payload was seen for the first time.
///
/// # Errors
///
/// Returns [`EtlError::Serialize`] if the payload cannot be encoded as JSON,
/// or [`EtlError::Db`] if the insert fails.
pub async fn ingest_raw(
    pool: &PgPool,
    payload: &RawJobPayload,
    environment: &str,
) -> Result<(RawJobRow, bool), EtlError> {
    let content_hash = payload.content_hash();
    let json = serde_json::to_value(payload)?;

    let (row, was_new) =
        insert_raw_job_if_new(pool, &payload.source, &json, &content_hash, environment).await?;

    if !was_new {
        tracing::debug!(
            source = %payload.source,
            content_hash = %content_hash,
            "raw payload already ingested"
        );
    }

    Ok((row, was_new))
}
