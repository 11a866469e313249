//! Source adapters for external job boards.
//!
//! Each adapter wraps one upstream API behind the [`JobSource`] fetch
//! contract and is resolved by name through the [`SourceRegistry`]. Adapters
//! never persist anything; they map upstream shapes into
//! [`jobintel_core::RawJobPayload`] and surface failures as typed
//! [`FetchError`]s.

mod arbeitnow;
mod error;
mod registry;
mod remoteok;
mod remotive;
mod source;

pub use arbeitnow::ArbeitnowSource;
pub use error::{FetchError, RegistryError};
pub use registry::SourceRegistry;
pub use remoteok::RemoteOkSource;
pub use remotive::RemotiveSource;
pub use source::{validate_payload, validate_payloads, JobSource};
