//! Sticker conversion pipeline orchestration.
//!
//! Ties the conformance engines together: classification routes an input
//! to the image or transcode path, Tenor links resolve to downloadable
//! assets first, staging directories guarantee cleanup on every exit
//! path, and admission control keeps each caller to one in-flight
//! conversion.

pub mod admission;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod staging;
pub mod tenor;

pub use admission::{AdmissionControl, AdmissionPermit};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::init_logging;
pub use pipeline::StickerPipeline;
pub use staging::StagingArea;
pub use tenor::{extract_tenor_id, is_tenor_link, TenorClient};
