//! The adapter fetch contract and batch payload validation.

use async_trait::async_trait;
use jobintel_core::RawJobPayload;

use crate::error::FetchError;

/// Capability interface every job-board adapter implements.
///
/// `fetch` handles pagination internally and returns at most `limit`
/// payloads. Zero results is `Ok(vec![])`, never an error. Adapters make
/// outbound network calls only; persistence belongs to the pipeline.
#[async_trait]
pub trait JobSource: std::fmt::Debug + Send + Sync {
    /// Registry key and the `source` value stamped on emitted payloads.
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` postings, optionally filtered by `search`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network, HTTP, or response-shape failure.
    async fn fetch(
        &self,
        search: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RawJobPayload>, FetchError>;
}

/// Check that a payload carries the fields the pipeline cannot work without.
///
/// # Errors
///
/// Returns a human-readable description of the missing fields.
pub fn validate_payload(payload: &RawJobPayload) -> Result<(), String> {
    let mut missing = Vec::new();
    if payload.source.trim().is_empty() {
        missing.push("source");
    }
    if payload.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
        missing.push("url");
    }
    if payload.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        missing.push("title");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing required fields: {}", missing.join(", ")))
    }
}

/// Validate a fetched batch, filtering out invalid payloads.
///
/// Returns the surviving payloads plus one warning string per rejected
/// payload, formatted as `[source] payload N: <reason>` so the run record
/// can attribute the problem.
#[must_use]
pub fn validate_payloads(
    payloads: Vec<RawJobPayload>,
    source_name: &str,
) -> (Vec<RawJobPayload>, Vec<String>) {
    let mut valid = Vec::with_capacity(payloads.len());
    let mut warnings = Vec::new();

    for (i, payload) in payloads.into_iter().enumerate() {
        match validate_payload(&payload) {
            Ok(()) => valid.push(payload),
            Err(reason) => warnings.push(format!("[{source_name}] payload {i}: {reason}")),
        }
    }

    (valid, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(url: Option<&str>, title: Option<&str>) -> RawJobPayload {
        RawJobPayload {
            source: "remotive".to_string(),
            url: url.map(str::to_string),
            title: title.map(str::to_string),
            ..RawJobPayload::default()
        }
    }

    #[test]
    fn complete_payload_passes_validation() {
        assert!(validate_payload(&payload(Some("https://x/1"), Some("Engineer"))).is_ok());
    }

    #[test]
    fn missing_url_is_reported() {
        let err = validate_payload(&payload(None, Some("Engineer"))).unwrap_err();
        assert!(err.contains("url"), "unexpected message: {err}");
    }

    #[test]
    fn blank_title_is_reported() {
        let err = validate_payload(&payload(Some("https://x/1"), Some("  "))).unwrap_err();
        assert!(err.contains("title"), "unexpected message: {err}");
    }

    #[test]
    fn batch_validation_filters_and_warns() {
        let batch = vec![
            payload(Some("https://x/1"), Some("Engineer")),
            payload(None, Some("No URL")),
            payload(Some("https://x/3"), None),
        ];
        let (valid, warnings) = validate_payloads(batch, "remotive");

        assert_eq!(valid.len(), 1);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("[remotive] payload 1:"));
        assert!(warnings[1].starts_with("[remotive] payload 2:"));
    }

    #[test]
    fn empty_batch_yields_nothing() {
        let (valid, warnings) = validate_payloads(Vec::new(), "remotive");
        assert!(valid.is_empty());
        assert!(warnings.is_empty());
    }
}
