//! Core domain types and configuration for JobIntel.
//!
//! Holds everything the other crates share: the environment model, app
//! configuration loading, the canonical raw payload shape with its content
//! hash, the normalized job type, and the skill vocabulary.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod payload;
pub mod text;
pub mod vocabulary;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use payload::{NormalizedJob, RawJobPayload};
pub use text::strip_html;
pub use vocabulary::{SkillVocabulary, VocabularyFile};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vocabulary file {path}: {source}")]
    VocabularyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vocabulary file: {0}")]
    VocabularyParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
