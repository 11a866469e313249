//! Normalization stage: raw payloads become deduplicated job records.
//!
//! Sources disagree on almost everything: descriptions arrive as HTML or
//! plain text, dates come as ISO dates, RFC 3339 timestamps, naive
//! timestamps, or epoch seconds. Normalization absorbs those differences;
//! an unparseable date degrades to `None` with a warning rather than
//! discarding the posting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use jobintel_core::{strip_html, NormalizedJob, RawJobPayload};
use sha2::{Digest, Sha256};

use crate::error::TransformError;

/// Converts a validated raw payload into a [`NormalizedJob`].
///
/// Returns the job plus any soft warnings (currently only an unparseable
/// `posted_at`).
///
/// # Errors
///
/// Returns [`TransformError::MissingUrl`] or [`TransformError::MissingTitle`]
/// if a required field is absent or blank; the caller skips the payload and
/// records the error as a run warning.
pub fn normalize(payload: &RawJobPayload) -> Result<(NormalizedJob, Vec<String>), TransformError> {
    let url = payload
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(TransformError::MissingUrl)?;
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(TransformError::MissingTitle)?;

    let mut warnings = Vec::new();

    let posted_at = match payload.posted_at.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = parse_posted_at(raw);
            if parsed.is_none() {
                warnings.push(format!(
                    "[{}] unparseable posted_at '{raw}' for {url}",
                    payload.source
                ));
            }
            parsed
        }
    };

    let company = clean_optional(payload.company.as_deref());
    let location = clean_optional(payload.location.as_deref());
    let description = payload
        .description
        .as_deref()
        .map(strip_html)
        .filter(|d| !d.is_empty());

    let dedup_hash = dedup_hash(title, company.as_deref(), location.as_deref(), posted_at);

    Ok((
        NormalizedJob {
            title: title.to_string(),
            company,
            location,
            url: url.to_string(),
            posted_at,
            description,
            dedup_hash,
        },
        warnings,
    ))
}

/// Parses a posted-at value in any of the formats the sources emit.
///
/// Accepted: ISO date (`2026-08-01`), RFC 3339, naive timestamp
/// (`2026-08-01T09:30:00`), or unix epoch seconds. Anything else is `None`.
#[must_use]
pub fn parse_posted_at(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive());
    }
    None
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// SHA-256 over `title|company|location|posted_at`, lowercased and trimmed.
///
/// Catches the same posting republished under a different URL.
fn dedup_hash(
    title: &str,
    company: Option<&str>,
    location: Option<&str>,
    posted_at: Option<NaiveDate>,
) -> String {
    let key = format!(
        "{}|{}|{}|{}",
        title.trim().to_lowercase(),
        company.unwrap_or("").trim().to_lowercase(),
        location.unwrap_or("").trim().to_lowercase(),
        posted_at.map(|d| d.to_string()).unwrap_or_default(),
    );
    hex::encode(Sha256::digest(key.as_bytes()))
}
