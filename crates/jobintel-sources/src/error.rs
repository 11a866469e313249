use thiserror::Error;

/// Errors returned by source adapters.
///
/// Every variant carries the adapter's name so the orchestrator can
/// attribute the failure to a source when recording run warnings.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS, or non-2xx HTTP failure from the underlying client.
    #[error("[{source_name}] HTTP error: {cause}")]
    Http {
        source_name: &'static str,
        #[source]
        cause: reqwest::Error,
    },

    /// The upstream returned a 2xx body that does not match its documented shape.
    #[error("[{source_name}] unexpected response: {reason}")]
    UnexpectedResponse {
        source_name: &'static str,
        reason: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("[{source_name}] JSON deserialization error for {context}: {cause}")]
    Deserialize {
        source_name: &'static str,
        context: String,
        #[source]
        cause: serde_json::Error,
    },
}

impl FetchError {
    /// The name of the source that produced this error.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        match self {
            FetchError::Http { source_name, .. }
            | FetchError::UnexpectedResponse { source_name, .. }
            | FetchError::Deserialize { source_name, .. } => source_name,
        }
    }
}

/// Errors raised by [`crate::SourceRegistry`] lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The caller asked for a source name that was never registered.
    #[error("unknown source '{name}'; available: [{available}]")]
    UnknownSource { name: String, available: String },
}
