/// Texture coordinate addressing outside `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Out-of-range coordinates read the nearest edge texel.
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

impl WrapMode {
    pub fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }

    /// Maps a texel index (possibly out of range) into `0..len`.
    pub(crate) fn resolve(self, index: i64, len: u32) -> u32 {
        let len = i64::from(len.max(1));
        let i = match self {
            WrapMode::ClampToEdge => index.clamp(0, len - 1),
            WrapMode::Repeat => index.rem_euclid(len),
            WrapMode::MirrorRepeat => {
                let period = index.rem_euclid(2 * len);
                if period < len { period } else { 2 * len - 1 - period }
            }
        };
        i as u32
    }
}

/// Minification / magnification filter.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// No interpolation: blocky scaling in both directions.
    #[default]
    Nearest,
    Linear,
}

impl FilterMode {
    pub fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Sampler state applied to both texture axes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SamplerConfig {
    pub wrap: WrapMode,
    pub filter: FilterMode,
}

impl SamplerConfig {
    pub fn descriptor(self, label: &str) -> wgpu::SamplerDescriptor<'_> {
        wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: self.wrap.to_wgpu(),
            address_mode_v: self.wrap.to_wgpu(),
            address_mode_w: self.wrap.to_wgpu(),
            mag_filter: self.filter.to_wgpu(),
            min_filter: self.filter.to_wgpu(),
            // Single mip level; the mip filter never selects between levels.
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clamped_nearest() {
        let d = SamplerConfig::default().descriptor("t");
        assert_eq!(d.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(d.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(d.min_filter, wgpu::FilterMode::Nearest);
        assert_eq!(d.mag_filter, wgpu::FilterMode::Nearest);
    }

    #[test]
    fn clamp_holds_edges() {
        assert_eq!(WrapMode::ClampToEdge.resolve(-3, 4), 0);
        assert_eq!(WrapMode::ClampToEdge.resolve(9, 4), 3);
    }

    #[test]
    fn repeat_and_mirror_wrap() {
        assert_eq!(WrapMode::Repeat.resolve(5, 4), 1);
        assert_eq!(WrapMode::Repeat.resolve(-1, 4), 3);
        assert_eq!(WrapMode::MirrorRepeat.resolve(4, 4), 3);
        assert_eq!(WrapMode::MirrorRepeat.resolve(-1, 4), 0);
    }
}
