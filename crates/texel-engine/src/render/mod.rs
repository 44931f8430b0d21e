//! Renderer-facing frame context.
//!
//! Convention:
//! - geometry is in NDC, transformed by a per-draw world matrix
//! - each frame starts with one pass that clears the target and sets the
//!   viewport to the full drawable

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
