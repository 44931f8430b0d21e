//! Image decoding and GPU texture upload.
//!
//! Decoded images are stored bottom row first, so texture coordinate
//! `(0, 0)` addresses the bottom-left pixel of the picture and `(1, 1)` the
//! top-right one, matching the UV layout of `geometry::Mesh::quad`.

mod image_data;
mod sampler;
mod texture;

pub use image_data::{ImageData, PixelLayout};
pub use sampler::{FilterMode, SamplerConfig, WrapMode};
pub use texture::Texture;
