//! Adapter for the Remotive remote-jobs API.
//!
//! Remotive supports server-side `search` and `limit` query parameters and
//! returns a single JSON envelope with a `jobs` array. Descriptions arrive
//! as HTML and are stripped to plain text before the payload is emitted, so
//! the raw record already holds cleaned text.

use std::time::Duration;

use async_trait::async_trait;
use jobintel_core::{strip_html, RawJobPayload};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::FetchError;
use crate::source::JobSource;

const SOURCE_NAME: &str = "remotive";
const DEFAULT_ENDPOINT: &str = "https://remotive.com/api/remote-jobs";

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<RemotiveJob>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    id: Option<i64>,
    url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    candidate_required_location: Option<String>,
    publication_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Client for the Remotive public API.
#[derive(Debug)]
pub struct RemotiveSource {
    client: Client,
    endpoint: Url,
}

impl RemotiveSource {
    /// Creates an adapter pointed at the production Remotive API.
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
impl JobSource for RemotiveSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(
        &self,
        search: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RawJobPayload>, FetchError> {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &limit.to_string());
            if let Some(term) = search {
                pairs.append_pair("search", term);
            }
        }

        let body = request_text(&self.client, SOURCE_NAME, url.clone()).await?;
        let response: RemotiveResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
                source_name: SOURCE_NAME,
                context: url.to_string(),
                cause: e,
            })?;

        let payloads = response
            .jobs
            .into_iter()
            .take(limit)
            .map(|job| RawJobPayload {
                source: SOURCE_NAME.to_string(),
                external_id: job.id.map(|id| id.to_string()),
                url: job.url,
                title: job.title,
                company: job.company_name,
                location: job.candidate_required_location,
                posted_at: job.publication_date,
                description: job.description.map(|d| strip_html(&d)),
                tags: job.tags,
            })
            .collect::<Vec<_>>();

        tracing::debug!(count = payloads.len(), "fetched Remotive jobs");
        Ok(payloads)
    }
}

/// Build a reqwest client with the shared timeout/user-agent settings.
pub(crate) fn build_client(
    source_name: &'static str,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()
        .map_err(|e| FetchError::Http {
            source_name,
            cause: e,
        })
}

/// Parse a base URL, surfacing bad input as a typed adapter error.
pub(crate) fn parse_endpoint(
    source_name: &'static str,
    base_url: &str,
) -> Result<Url, FetchError> {
    Url::parse(base_url).map_err(|e| FetchError::UnexpectedResponse {
        source_name,
        reason: format!("invalid base URL '{base_url}': {e}"),
    })
}

/// GET `url`, assert a 2xx status, and return the body text.
pub(crate) async fn request_text(
    client: &Client,
    source_name: &'static str,
    url: Url,
) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Http {
            source_name,
            cause: e,
        })?;
    let response = response.error_for_status().map_err(|e| FetchError::Http {
        source_name,
        cause: e,
    })?;
    response.text().await.map_err(|e| FetchError::Http {
        source_name,
        cause: e,
    })
}
