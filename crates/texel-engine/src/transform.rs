//! 2D model transform.
//!
//! `Transform2D` holds a uniform scale, a translation and a rotation angle
//! about +Z. The model matrix applies them as `translation * rotation * scale`:
//! local geometry is scaled first, then rotated, then moved into place.

use std::f64::consts::TAU;

use glam::{Mat4, Vec2, Vec3};

use crate::time::FrameTime;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    scale: f32,
    position: Vec2,
    /// Rotation in radians, kept in `[0, 2π)`. Stored as f64 so a 0.0002 step
    /// is never lost to rounding.
    rotation: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

impl Transform2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Adds `delta` radians and folds the result back into one turn.
    pub fn rotate(&mut self, delta: f32) {
        self.rotation = (self.rotation + f64::from(delta)).rem_euclid(TAU);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current angle in `[0, 2π)`.
    pub fn rotation(&self) -> f32 {
        self.rotation as f32
    }

    /// World matrix: `translation * rotation * scale`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position.extend(0.0))
            * Mat4::from_rotation_z(self.rotation())
            * Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))
    }

    /// Column-major matrix as uploaded to a `mat4x4<f32>` uniform.
    pub fn matrix_cols(&self) -> [[f32; 4]; 4] {
        self.matrix().to_cols_array_2d()
    }
}

/// How the rotation advances each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RotationMode {
    /// Fixed angle per presented frame. Speed follows the display refresh rate.
    PerFrame(f32),
    /// Angle per second of (clamped) frame time.
    PerSecond(f32),
}

impl RotationMode {
    /// Angle to add for the frame described by `time`.
    pub fn step(self, time: &FrameTime) -> f32 {
        match self {
            RotationMode::PerFrame(delta) => delta,
            RotationMode::PerSecond(rate) => rate * time.dt,
        }
    }

    pub fn advance(self, transform: &mut Transform2D, time: &FrameTime) {
        transform.rotate(self.step(time));
    }
}
