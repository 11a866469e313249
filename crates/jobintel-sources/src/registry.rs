//! Name → adapter registry used by the pipeline orchestrator.

use std::collections::BTreeMap;
use std::sync::Arc;

use jobintel_core::AppConfig;

use crate::arbeitnow::ArbeitnowSource;
use crate::error::{FetchError, RegistryError};
use crate::remoteok::RemoteOkSource;
use crate::remotive::RemotiveSource;
use crate::source::JobSource;

/// Pure name → adapter mapping, no I/O.
///
/// Lets the orchestrator iterate "all sources" without hardcoding adapter
/// types; tests register stub adapters the same way production code
/// registers real ones.
#[derive(Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<dyn JobSource>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with the production adapters wired in.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if an adapter's HTTP client cannot be built.
    pub fn with_default_sources(config: &AppConfig) -> Result<Self, FetchError> {
        let mut registry = Self::new();
        registry.register(Arc::new(RemotiveSource::new(
            config.fetch_timeout_secs,
            &config.fetch_user_agent,
        )?));
        registry.register(Arc::new(RemoteOkSource::new(
            config.fetch_timeout_secs,
            &config.fetch_user_agent,
        )?));
        registry.register(Arc::new(ArbeitnowSource::new(
            config.fetch_timeout_secs,
            &config.fetch_user_agent,
        )?));
        Ok(registry)
    }

    /// Register an adapter under its own name (idempotent: the first
    /// registration for a name wins).
    pub fn register(&mut self, adapter: Arc<dyn JobSource>) {
        self.sources
            .entry(adapter.name().to_string())
            .or_insert(adapter);
    }

    /// Look up an adapter by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSource`] listing the registered names
    /// if no adapter matches.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn JobSource>, RegistryError> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownSource {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// All registered source names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
