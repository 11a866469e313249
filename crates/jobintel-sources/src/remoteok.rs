//! Adapter for the RemoteOK API.
//!
//! RemoteOK serves one JSON array whose first element is a legal/metadata
//! notice, not a job. The API has no search parameter, so filtering happens
//! client-side, and it rejects requests without a User-Agent header.

use async_trait::async_trait;
use chrono::DateTime;
use jobintel_core::RawJobPayload;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::FetchError;
use crate::remotive::{build_client, parse_endpoint, request_text};
use crate::source::JobSource;

const SOURCE_NAME: &str = "remoteok";
const DEFAULT_ENDPOINT: &str = "https://remoteok.com/api";

#[derive(Debug, Deserialize)]
struct RemoteOkJob {
    id: Option<serde_json::Value>,
    url: Option<String>,
    position: Option<String>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    date: Option<String>,
    epoch: Option<i64>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Client for the RemoteOK public API.
#[derive(Debug)]
pub struct RemoteOkSource {
    client: Client,
    endpoint: Url,
}

impl RemoteOkSource {
    /// Creates an adapter pointed at the production RemoteOK API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_ENDPOINT)
    }

    /// Creates an adapter with a custom endpoint (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built, or
    /// [`FetchError::UnexpectedResponse`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = build_client(SOURCE_NAME, timeout_secs, user_agent)?;
        let endpoint = parse_endpoint(SOURCE_NAME, base_url)?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl JobSource for RemoteOkSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(
        &self,
        search: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RawJobPayload>, FetchError> {
        let url = self.endpoint.clone();
        let body = request_text(&self.client, SOURCE_NAME, url.clone()).await?;

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
                source_name: SOURCE_NAME,
                context: url.to_string(),
                cause: e,
            })?;

        // First array element is API metadata, not a posting.
        let jobs = entries.into_iter().skip(1);

        let mut payloads = Vec::new();
        for entry in jobs {
            if payloads.len() >= limit {
                break;
            }
            // Entries that fail to match the job shape are skipped, not fatal.
            let Ok(job) = serde_json::from_value::<RemoteOkJob>(entry) else {
                continue;
            };

            if let Some(term) = search {
                if !matches_search(&job, term) {
                    continue;
                }
            }

            payloads.push(into_payload(job));
        }

        tracing::debug!(count = payloads.len(), "fetched RemoteOK jobs");
        Ok(payloads)
    }
}

fn matches_search(job: &RemoteOkJob, term: &str) -> bool {
    let needle = term.to_lowercase();
    let haystack = format!(
        "{} {} {}",
        job.position.as_deref().or(job.title.as_deref()).unwrap_or(""),
        job.company.as_deref().unwrap_or(""),
        job.description.as_deref().unwrap_or(""),
    )
    .to_lowercase();
    haystack.contains(&needle)
}

fn into_payload(job: RemoteOkJob) -> RawJobPayload {
    let external_id = job.id.as_ref().map(|v| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    // RemoteOK sometimes omits `url`; reconstruct it from the posting id.
    let url = job.url.or_else(|| {
        external_id
            .as_ref()
            .map(|id| format!("https://remoteok.com/remote-jobs/{id}"))
    });

    // Prefer the ISO `date` field; fall back to the epoch timestamp.
    let posted_at = job.date.or_else(|| {
        job.epoch
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339())
    });

    RawJobPayload {
        source: SOURCE_NAME.to_string(),
        external_id,
        url,
        title: job.position.or(job.title),
        company: job.company,
        location: job.location.or_else(|| Some("Remote".to_string())),
        posted_at,
        description: job.description,
        tags: job.tags,
    }
}
