//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - tracking the viewport as the window is resized
//! - acquiring frames and providing encoders/views for rendering
//! - catching validation errors from resource creation

mod gpu;
mod scope;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
pub use scope::with_validation;
