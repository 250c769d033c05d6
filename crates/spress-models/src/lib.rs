//! Shared data models for StickerPress.
//!
//! This crate provides the pure, I/O-free types the pipeline is built on:
//! - Sticker conformance policy constants
//! - Input format classification
//! - VP9 encode escalation tiers
//! - Asset descriptors for uploaded and remote media

pub mod asset;
pub mod encode;
pub mod format;
pub mod policy;
pub mod utils;

// Re-export common types
pub use asset::{MediaAsset, RemoteAsset};
pub use encode::{EncodeParameters, EncodeTier, PIXEL_FORMAT, QUALITY_PRESET, VIDEO_CODEC};
pub use format::{classify, Classification};
pub use policy::StickerPolicy;
pub use utils::first_match;
