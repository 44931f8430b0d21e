//! Color values used for vertex tinting and framebuffer clears.

mod color;

pub use color::Color;
