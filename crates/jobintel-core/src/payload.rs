//! Canonical raw payload and normalized job shapes.
//!
//! Adapters emit [`RawJobPayload`] regardless of the upstream API's field
//! names; the transform stage turns stored payloads into [`NormalizedJob`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A job posting as received from a source, mapped to canonical field names.
///
/// Everything except `source` is optional at this stage; validation of
/// required fields happens at the registry boundary and normalization
/// failures downstream become run warnings rather than hard errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJobPayload {
    pub source: String,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Source-native date string; parsed into a `NaiveDate` during transform.
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// Field boundaries in the hash input are marked with a unit separator so
// that ("ab", "c") and ("a", "bc") never collide.
const FIELD_SEPARATOR: [u8; 1] = [0x1f];

impl RawJobPayload {
    /// Deterministic SHA-256 digest over the identity-bearing fields.
    ///
    /// Fields are fed to the hasher in a fixed order, so byte-identical
    /// payloads always produce the same hash and raw ingestion can dedup on
    /// it. `tags` is deliberately excluded: tag-only churn upstream should
    /// not create new raw records.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        let fields = [
            Some(self.source.as_str()),
            self.external_id.as_deref(),
            self.url.as_deref(),
            self.title.as_deref(),
            self.company.as_deref(),
            self.location.as_deref(),
            self.posted_at.as_deref(),
            self.description.as_deref(),
        ];
        for field in fields {
            hasher.update(field.unwrap_or("").as_bytes());
            hasher.update(FIELD_SEPARATOR);
        }
        hex::encode(hasher.finalize())
    }
}

/// A payload after normalization: cleaned description, parsed date, and a
/// dedup hash over the identity fields. `url` is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedJob {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub url: String,
    pub posted_at: Option<NaiveDate>,
    pub description: Option<String>,
    pub dedup_hash: String,
}
