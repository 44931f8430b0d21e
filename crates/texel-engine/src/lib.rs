//! Texel engine crate.
//!
//! This crate owns the platform + GPU runtime pieces and the small set of
//! GPU resource wrappers (geometry, textures, shader programs) that a
//! textured-quad program is built from.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;

pub mod error;
pub mod geometry;
pub mod shader;
pub mod texture;
pub mod transform;

pub use error::{ResourceError, ResourceResult};
