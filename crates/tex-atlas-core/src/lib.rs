//! Batch texture-atlas builder.
//!
//! - Candidates: source images plus optional GPU sampler state, deduplicated by key
//! - Packing: largest-first, first-fit guillotine allocation into atlases whose members share
//!   pixel layout and sampler state; periodic (repeat/mirror) axes pin the atlas to one size
//! - Output: power-of-two atlas images with replicated bleed margins, and a UV transform per key
//!
//! Quick example:
//! ```ignore
//! use tex_atlas_core::{AtlasBuilder, AtlasConfig, PixelBuffer, PixelLayout};
//! # fn main() -> tex_atlas_core::Result<()> {
//! let cfg = AtlasConfig::builder().with_max_dimensions(1024, 1024).margin(2).build();
//! let mut builder = AtlasBuilder::new(cfg)?;
//! builder.add("grass", PixelBuffer::zeroed(64, 64, PixelLayout::RGBA8)?, None);
//! builder.add("stone", PixelBuffer::zeroed(32, 32, PixelLayout::RGBA8)?, None);
//! builder.build()?;
//! let hit = builder.lookup("grass")?;
//! println!("atlas {:?}, uv {:?}", hit.atlas, hit.transform);
//! # Ok(()) }
//! ```

pub mod atlas;
pub mod builder;
pub mod candidate;
pub mod compat;
pub mod compositing;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pixels;
pub mod sampler;

pub use atlas::*;
pub use builder::*;
pub use candidate::*;
pub use compat::*;
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pixels::*;
pub use sampler::*;

/// Convenience prelude for common types and functions.
/// Importing `tex_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::atlas::{Atlas, AtlasId};
    pub use crate::builder::{AtlasBuilder, AtlasLookup};
    pub use crate::candidate::{Candidate, CandidateId, Placement};
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder};
    pub use crate::diagnostics::{Axis, Diagnostic, DiagnosticSink, Rejection, TracingSink};
    pub use crate::model::{AtlasStats, Rect, UvTransform};
    pub use crate::pixels::{DataType, PixelBuffer, PixelFormat, PixelLayout};
    pub use crate::sampler::{CompareFunction, FilterMode, InternalFormat, SamplerDesc, WrapMode};
}
