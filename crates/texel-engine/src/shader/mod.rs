//! Shader programs.
//!
//! A program is built in three steps, each of which can fail with a
//! `ResourceError`:
//! - read WGSL source text for each stage from disk
//! - compile: parse + validate with naga, locate the stage entry point
//! - link: check the vertex → fragment interface, vertex inputs against the
//!   vertex buffer layout, and bind slots shared between stages; then build
//!   the wgpu pipeline
//!
//! Uniforms are looked up by the name of the WGSL global they are declared
//! as, the way a GL program resolves uniform locations.

mod program;
mod reflect;
mod stage;
mod uniform;

pub use program::{check_link, ProgramLayout, ShaderProgram, SAMPLER_SUFFIX};
pub use reflect::{UniformKind, UniformLocation};
pub use stage::{CompiledShader, ShaderSource, ShaderStage};
pub use uniform::MatrixUniform;
