use winit::dpi::PhysicalSize;

/// Framebuffer viewport in physical pixels.
///
/// Renderers pass this straight to `RenderPass::set_viewport`. The runtime
/// keeps it at `(0, 0, width, height)` of the current drawable size.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Full-surface viewport for a drawable of `width` x `height`.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn from_physical(size: PhysicalSize<u32>) -> Self {
        Self::from_size(size.width, size.height)
    }

    /// Viewport after the drawable is resized to `size`.
    ///
    /// A zero-area size (minimized window) keeps the current viewport.
    #[inline]
    pub fn resized(self, size: PhysicalSize<u32>) -> Self {
        let next = Self::from_physical(size);
        if next.is_valid() { next } else { self }
    }

    /// A zero-area viewport cannot be rendered into (minimized window).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Applies this viewport to a render pass (depth range `0..1`).
    pub fn apply(self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_viewport(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            0.0,
            1.0,
        );
    }
}
