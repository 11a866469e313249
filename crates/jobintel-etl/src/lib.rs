//! Ingestion pipeline: raw capture, normalization, skill extraction, and the
//! run orchestrator that ties them together.

pub mod error;
pub mod pipeline;
pub mod raw;
pub mod skills;
pub mod transform;

pub use error::{EtlError, TransformError};
pub use pipeline::{run_pipeline, PipelineRequest, SourceSelection};
pub use raw::ingest_raw;
pub use skills::{extract_skills, extract_and_link_skills};
pub use transform::normalize;
