use std::path::{Path, PathBuf};

use glam::Vec2;
use texel_engine::paint::Color;
use texel_engine::texture::SamplerConfig;
use texel_engine::transform::RotationMode;

/// Inputs of the textured-quad demo.
///
/// Resource paths are relative; [`DemoConfig::locate`] anchors them at the
/// directory the program finds its files in.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub texture_path: PathBuf,
    pub vertex_shader_path: PathBuf,
    pub fragment_shader_path: PathBuf,
    pub sampler: SamplerConfig,
    pub scale: f32,
    pub position: Vec2,
    pub rotation: RotationMode,
    pub clear_color: Color,
}

impl DemoConfig {
    pub const TITLE: &'static str = "Textures";
    pub const WIDTH: u32 = 800;
    pub const HEIGHT: u32 = 600;

    /// Radians added each frame.
    pub const ROTATION_PER_FRAME: f32 = 0.0002;

    pub const TEXTURE_FILE: &'static str = "assets/texture.png";
    pub const VERTEX_SHADER_FILE: &'static str = "shaders/vertex.wgsl";
    pub const FRAGMENT_SHADER_FILE: &'static str = "shaders/fragment.wgsl";

    /// Default configuration anchored at the working directory, or else at
    /// the directory holding the executable. With neither holding the files
    /// the paths stay relative, and loading reports them missing.
    pub fn locate() -> Self {
        let candidates = [
            std::env::current_dir().ok(),
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
        ];

        let config = Self::default();
        match find_base(candidates.into_iter().flatten()) {
            Some(base) => {
                log::debug!("resources found under {}", base.display());
                config.anchored_at(&base)
            }
            None => {
                log::warn!("no directory with {} found; using relative paths", Self::TEXTURE_FILE);
                config
            }
        }
    }

    pub fn anchored_at(mut self, base: &Path) -> Self {
        self.texture_path = base.join(&self.texture_path);
        self.vertex_shader_path = base.join(&self.vertex_shader_path);
        self.fragment_shader_path = base.join(&self.fragment_shader_path);
        self
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            texture_path: PathBuf::from(Self::TEXTURE_FILE),
            vertex_shader_path: PathBuf::from(Self::VERTEX_SHADER_FILE),
            fragment_shader_path: PathBuf::from(Self::FRAGMENT_SHADER_FILE),
            sampler: SamplerConfig::default(),
            scale: 0.5,
            position: Vec2::new(0.25, 0.25),
            rotation: RotationMode::PerFrame(Self::ROTATION_PER_FRAME),
            clear_color: Color::TRANSPARENT,
        }
    }
}

/// First directory holding all three resource files.
fn find_base(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|base| {
        [
            DemoConfig::TEXTURE_FILE,
            DemoConfig::VERTEX_SHADER_FILE,
            DemoConfig::FRAGMENT_SHADER_FILE,
        ]
        .iter()
        .all(|file| base.join(file).is_file())
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use texel_engine::texture::{FilterMode, WrapMode};

    use super::*;

    fn populate(dir: &Path) {
        for file in [
            DemoConfig::TEXTURE_FILE,
            DemoConfig::VERTEX_SHADER_FILE,
            DemoConfig::FRAGMENT_SHADER_FILE,
        ] {
            let path = dir.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"x").unwrap();
        }
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn default_paths_are_relative() {
        let cfg = DemoConfig::default();
        assert!(cfg.texture_path.is_relative());
        assert!(cfg.vertex_shader_path.is_relative());
        assert!(cfg.fragment_shader_path.is_relative());
    }

    #[test]
    fn defaults_point_at_bundled_files() {
        // Tests run from the package directory.
        let cfg = DemoConfig::default();
        assert!(cfg.texture_path.is_file(), "{}", cfg.texture_path.display());
        assert!(cfg.vertex_shader_path.is_file());
        assert!(cfg.fragment_shader_path.is_file());
    }

    #[test]
    fn defaults_match_demo_scene() {
        let cfg = DemoConfig::default();
        assert_eq!(cfg.scale, 0.5);
        assert_eq!(cfg.position, Vec2::new(0.25, 0.25));
        assert_eq!(cfg.rotation, RotationMode::PerFrame(0.0002));
        assert_eq!(cfg.sampler.wrap, WrapMode::ClampToEdge);
        assert_eq!(cfg.sampler.filter, FilterMode::Nearest);
        assert_eq!(cfg.clear_color, Color::TRANSPARENT);
    }

    // ── locating resources ────────────────────────────────────────────────

    #[test]
    fn first_directory_with_all_files_wins() {
        let empty = tempfile::tempdir().unwrap();
        let partial = tempfile::tempdir().unwrap();
        let full = tempfile::tempdir().unwrap();
        let also_full = tempfile::tempdir().unwrap();

        fs::create_dir_all(partial.path().join("assets")).unwrap();
        fs::write(partial.path().join(DemoConfig::TEXTURE_FILE), b"x").unwrap();
        populate(full.path());
        populate(also_full.path());

        let found = find_base([
            empty.path().to_path_buf(),
            partial.path().to_path_buf(),
            full.path().to_path_buf(),
            also_full.path().to_path_buf(),
        ]);
        assert_eq!(found.as_deref(), Some(full.path()));
    }

    #[test]
    fn nothing_found_without_resources() {
        let empty = tempfile::tempdir().unwrap();
        assert_eq!(find_base([empty.path().to_path_buf()]), None);
    }

    #[test]
    fn anchoring_joins_every_path() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let cfg = DemoConfig::default().anchored_at(dir.path());
        assert_eq!(cfg.texture_path, dir.path().join("assets/texture.png"));
        assert!(cfg.texture_path.is_file());
        assert!(cfg.vertex_shader_path.is_file());
        assert!(cfg.fragment_shader_path.is_file());
    }
}
