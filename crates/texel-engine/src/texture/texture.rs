use crate::device::with_validation;
use crate::error::{ResourceError, ResourceResult};

use super::{ImageData, PixelLayout, SamplerConfig};

/// GPU-resident 2D texture with its view and sampler.
///
/// Storage is always `Rgba8Unorm`. Dropping the value releases all three
/// wgpu objects.
pub struct Texture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
}

impl Texture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a texture sized to `image` and uploads its pixels.
    ///
    /// The image's declared channel order is converted to the RGBA storage
    /// order during upload. `image` is consumed: once the queue holds the
    /// copy, the CPU-side pixels are dropped.
    ///
    /// Fails if either side exceeds the device's 2D texture limit or the
    /// device rejects the texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: ImageData,
        sampler: SamplerConfig,
        label: &str,
    ) -> ResourceResult<Self> {
        let (width, height) = (image.width(), image.height());
        check_size(label, width, height, device.limits().max_texture_dimension_2d)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let upload = image.into_layout(PixelLayout::Rgba8);

        let (texture, error) = with_validation(device, || {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                upload.bytes(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(upload.bytes_per_row()),
                    rows_per_image: Some(height),
                },
                size,
            );
            texture
        });
        drop(upload);

        if let Some(err) = error {
            return Err(ResourceError::TextureUpload {
                label: label.to_string(),
                message: err.to_string(),
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler_label = format!("{label} sampler");
        let sampler = device.create_sampler(&sampler.descriptor(&sampler_label));

        log::info!("texture `{label}` uploaded: {width}x{height}");

        Ok(Self {
            _texture: texture,
            view,
            sampler,
            width,
            height,
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Rejects images the device cannot hold in one 2D texture.
fn check_size(label: &str, width: u32, height: u32, max: u32) -> ResourceResult<()> {
    if width > max || height > max {
        return Err(ResourceError::TextureTooLarge {
            label: label.to_string(),
            width,
            height,
            max,
        });
    }
    Ok(())
}
