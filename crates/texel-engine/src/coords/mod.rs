//! Coordinate types shared across the runtime and renderers.
//!
//! Geometry lives in normalized device coordinates (NDC): origin at the
//! centre, +X right, +Y up, both axes spanning `[-1, 1]`. The viewport maps
//! NDC onto the framebuffer in physical pixels.

mod viewport;

pub use viewport::Viewport;
