use std::path::Path;

use crate::error::{ResourceError, ResourceResult};

use super::WrapMode;

/// Byte order of one 32-bit pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelLayout {
    /// Blue, green, red, alpha. Canonical layout after decoding.
    Bgra8,
    /// Red, green, blue, alpha. GPU storage layout.
    Rgba8,
}

impl PixelLayout {
    pub const BYTES_PER_PIXEL: usize = 4;
}

/// Decoded 32-bit pixel buffer.
///
/// Rows are stored bottom-up: row 0 is the bottom of the picture.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Reads and decodes an image file into the canonical BGRA layout.
    ///
    /// The format is detected from the file contents, not the extension.
    pub fn load(path: impl AsRef<Path>) -> ResourceResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ResourceError::from_io(path, e))?;

        let format = image::guess_format(&bytes).map_err(|e| ResourceError::Decode {
            path: path.to_path_buf(),
            message: format!("unrecognized image format: {e}"),
        })?;

        let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
            ResourceError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(ResourceError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        log::debug!(
            "decoded {} as {:?}, {}x{} {:?}",
            path.display(),
            format,
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        let mut rgba = decoded.into_rgba8();
        image::imageops::flip_vertical_in_place(&mut rgba);
        let (width, height) = rgba.dimensions();
        Ok(Self::from_rgba8_bottom_up(width, height, rgba.into_raw()).into_layout(PixelLayout::Bgra8))
    }

    /// Wraps top-down RGBA8 rows (as most image APIs produce them).
    ///
    /// Both dimensions must be non-zero and `top_down` must hold exactly
    /// `width * height` pixels.
    pub fn from_rgba8(width: u32, height: u32, top_down: Vec<u8>) -> ResourceResult<Self> {
        if width == 0 || height == 0 {
            return Err(ResourceError::PixelBuffer {
                message: format!("{width}x{height} image has no pixels"),
            });
        }
        let stride = width as usize * PixelLayout::BYTES_PER_PIXEL;
        let expected = stride * height as usize;
        if top_down.len() != expected {
            return Err(ResourceError::PixelBuffer {
                message: format!(
                    "{width}x{height} RGBA8 needs {expected} bytes, got {}",
                    top_down.len()
                ),
            });
        }

        let mut pixels = Vec::with_capacity(expected);
        for row in top_down.chunks_exact(stride).rev() {
            pixels.extend_from_slice(row);
        }
        Ok(Self::from_rgba8_bottom_up(width, height, pixels))
    }

    fn from_rgba8_bottom_up(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout: PixelLayout::Rgba8,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw bytes in `layout()` order, bottom row first.
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * PixelLayout::BYTES_PER_PIXEL as u32
    }

    /// Reorders channels into `layout`, in place.
    pub fn into_layout(mut self, layout: PixelLayout) -> Self {
        if layout != self.layout {
            // BGRA <-> RGBA is the same swap in both directions.
            for px in self.pixels.chunks_exact_mut(PixelLayout::BYTES_PER_PIXEL) {
                px.swap(0, 2);
            }
            self.layout = layout;
        }
        self
    }

    /// Pixel at `(x, y)` with `y = 0` at the bottom, returned as RGBA.
    /// `None` outside the image.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * PixelLayout::BYTES_PER_PIXEL;
        let p = self.pixels.get(i..i + PixelLayout::BYTES_PER_PIXEL)?;
        Some(match self.layout {
            PixelLayout::Rgba8 => [p[0], p[1], p[2], p[3]],
            PixelLayout::Bgra8 => [p[2], p[1], p[0], p[3]],
        })
    }

    /// Nearest-neighbour lookup at texture coordinate `(u, v)`, RGBA out.
    ///
    /// Uses the same texel selection as the GPU sampler: `floor(u * width)`,
    /// then `wrap` for indices outside the image.
    pub fn sample_nearest(&self, u: f32, v: f32, wrap: WrapMode) -> [u8; 4] {
        let x = wrap.resolve((u * self.width as f32).floor() as i64, self.width);
        let y = wrap.resolve((v * self.height as f32).floor() as i64, self.height);
        // Both indices are in range for the non-empty images this type holds.
        self.rgba_at(x, y).unwrap_or_default()
    }
}
