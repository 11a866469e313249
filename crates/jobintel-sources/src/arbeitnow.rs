//! Adapter for the Arbeitnow job-board API.
//!
//! Arbeitnow paginates through a `data` array with a `links.next` cursor
//! and timestamps postings with unix epoch seconds. The API has no usable
//! search parameter, so the search filter is applied client-side while
//! walking pages up to the requested limit.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use jobintel_core::RawJobPayload;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::FetchError;
use crate::remotive::{build_client, parse_endpoint, request_text};
use crate::source::JobSource;

const SOURCE_NAME: &str = "arbeitnow";
const DEFAULT_ENDPOINT: &str = "https://arbeitnow.com/api/job-board-api";
/// Upper bound on the page walk so a misbehaving cursor cannot loop forever.
const MAX_PAGES: u32 = 10;
/// Courtesy delay between page requests; Arbeitnow rate-limits aggressively.
const INTER_PAGE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    #[serde(default)]
    data: Vec<ArbeitnowJob>,
    #[serde(default)]
    links: ArbeitnowLinks,
}

#[derive(Debug, Default, Deserialize)]
struct ArbeitnowLinks {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: Option<String>,
    url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    created_at: Option<i64>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    job_types: Vec<String>,
}

/// Client for the Arbeitnow public API.
#[derive(Debug)]
pub struct ArbeitnowSource {
    client: Client,
    endpoint: Url,
}

impl ArbeitnowSource {
    /// Creates an adapter pointed at the production Arbeitnow API.
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

    async fn fetch_page(&self, page: u32) -> Result<ArbeitnowResponse, FetchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());

        let body = request_text(&self.client, SOURCE_NAME, url.clone()).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
            source_name: SOURCE_NAME,
            context: url.to_string(),
            cause: e,
        })
    }
}

#[async_trait]
impl JobSource for ArbeitnowSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(
        &self,
        search: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RawJobPayload>, FetchError> {
        let mut payloads = Vec::new();

        for page in 1..=MAX_PAGES {
            if payloads.len() >= limit {
                break;
            }
            if page > 1 {
                tokio::time::sleep(INTER_PAGE_DELAY).await;
            }

            let response = self.fetch_page(page).await?;
            if response.data.is_empty() {
                break;
            }
            let has_next = response.links.next.is_some();

            for job in response.data {
                if payloads.len() >= limit {
                    break;
                }
                if let Some(term) = search {
                    if !matches_search(&job, term) {
                        continue;
                    }
                }
                payloads.push(into_payload(job));
            }

            if !has_next {
                break;
            }
        }

        tracing::debug!(count = payloads.len(), "fetched Arbeitnow jobs");
        Ok(payloads)
    }
}

fn matches_search(job: &ArbeitnowJob, term: &str) -> bool {
    let needle = term.to_lowercase();
    let haystack = format!(
        "{} {} {}",
        job.title.as_deref().unwrap_or(""),
        job.company_name.as_deref().unwrap_or(""),
        job.description.as_deref().unwrap_or(""),
    )
    .to_lowercase();
    haystack.contains(&needle)
}

fn into_payload(job: ArbeitnowJob) -> RawJobPayload {
    let posted_at = job
        .created_at
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339());

    let mut tags = job.tags;
    tags.extend(job.job_types);

    RawJobPayload {
        source: SOURCE_NAME.to_string(),
        external_id: job.slug,
        url: job.url,
        title: job.title,
        company: job.company_name,
        location: job.location,
        posted_at,
        description: job.description,
        tags,
    }
}
