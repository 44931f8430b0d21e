//! Vertex data and GPU-resident shapes.
//!
//! `Mesh` is the validated CPU-side description; `Shape` owns the vertex and
//! index buffers built from it and releases them on drop.

mod mesh;
mod shape;
mod vertex;

pub use mesh::{Mesh, QUAD_INDICES};
pub use shape::Shape;
pub use vertex::Vertex;
