use anyhow::{Context, Result};

use texel_engine::error::{ResourceError, ResourceResult};
use texel_engine::geometry::{Mesh, Shape, Vertex};
use texel_engine::paint::Color;
use texel_engine::render::{RenderCtx, RenderTarget};
use texel_engine::shader::{
    check_link, CompiledShader, MatrixUniform, ProgramLayout, ShaderProgram, ShaderSource,
    ShaderStage, UniformKind, SAMPLER_SUFFIX,
};
use texel_engine::texture::{ImageData, Texture, WrapMode};
use texel_engine::time::FrameTime;
use texel_engine::transform::{RotationMode, Transform2D};

use crate::config::DemoConfig;

pub const WORLD_MATRIX: &str = "worldMatrix";
pub const TEXTURE: &str = "tex";

/// CPU-side inputs of the scene: decoded image and compiled stages.
///
/// Everything here is loaded and checked before any GPU object exists.
pub struct SceneSources {
    pub image: ImageData,
    pub vertex: CompiledShader,
    pub fragment: CompiledShader,
}

impl SceneSources {
    pub fn load(config: &DemoConfig) -> ResourceResult<Self> {
        let image = ImageData::load(&config.texture_path)?;
        log_corners(&image, config);

        let vertex = ShaderSource::from_file(&config.vertex_shader_path, ShaderStage::Vertex)?
            .compile()?;
        let fragment =
            ShaderSource::from_file(&config.fragment_shader_path, ShaderStage::Fragment)?
                .compile()?;

        Ok(Self {
            image,
            vertex,
            fragment,
        })
    }

    /// Link check without a device; resolves the uniforms the scene binds.
    pub fn check(&self) -> ResourceResult<ProgramLayout> {
        let layout = check_link(&self.vertex, &self.fragment, &Vertex::ATTRIBUTES)?;
        check_scene_layout(&layout)?;
        Ok(layout)
    }
}

/// The scene binds exactly one group: `worldMatrix`, `tex` and its sampler.
/// Any other slot would be left unbound at draw time.
fn check_scene_layout(layout: &ProgramLayout) -> ResourceResult<()> {
    let world = layout.resolve(WORLD_MATRIX, UniformKind::Matrix4)?;
    let tex = layout.resolve(TEXTURE, UniformKind::Texture2d)?;
    let sampler = layout.resolve(&format!("{TEXTURE}{SAMPLER_SUFFIX}"), UniformKind::Sampler)?;

    if tex.group != world.group || sampler.group != world.group {
        return Err(ResourceError::Link {
            message: format!(
                "`{WORLD_MATRIX}`, `{TEXTURE}` and its sampler must share one bind group \
                 (found groups {}, {}, {})",
                world.group, tex.group, sampler.group
            ),
        });
    }
    if layout.group_count() != 1 || layout.len() != 3 {
        return Err(ResourceError::Link {
            message: format!(
                "program declares {} bind slot(s) in {} group(s); only `{WORLD_MATRIX}`, \
                 `{TEXTURE}` and its sampler are bound",
                layout.len(),
                layout.group_count()
            ),
        });
    }
    Ok(())
}

fn log_corners(image: &ImageData, config: &DemoConfig) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let wrap = WrapMode::ClampToEdge;
    log::debug!(
        "{}: uv(0,0)={:?} uv(1,0)={:?} uv(0,1)={:?} uv(1,1)={:?}",
        config.texture_path.display(),
        image.sample_nearest(0.0, 0.0, wrap),
        image.sample_nearest(1.0, 0.0, wrap),
        image.sample_nearest(0.0, 1.0, wrap),
        image.sample_nearest(1.0, 1.0, wrap),
    );
}

/// Everything drawn each frame.
///
/// Field order is drop order: bind group, then the resources it references.
pub struct Scene {
    bind_group: wgpu::BindGroup,
    world: MatrixUniform,
    program: ShaderProgram,
    texture: Texture,
    shape: Shape,

    transform: Transform2D,
    rotation: RotationMode,
    clear: Color,
}

impl Scene {
    pub fn load(rctx: &RenderCtx<'_>, config: &DemoConfig) -> Result<Self> {
        let sources = SceneSources::load(config).context("failed to load scene resources")?;
        Self::build(rctx, sources, config).context("failed to build scene")
    }

    fn build(rctx: &RenderCtx<'_>, sources: SceneSources, config: &DemoConfig) -> ResourceResult<Self> {
        let SceneSources {
            image,
            vertex,
            fragment,
        } = sources;

        let shape = Shape::new(rctx.device, &Mesh::quad(), "quad");
        let texture = Texture::from_image(rctx.device, rctx.queue, image, config.sampler, "quad texture")?;

        let program = ShaderProgram::link(
            rctx.device,
            &vertex,
            &fragment,
            Vertex::layout(),
            rctx.surface_format,
            "textured quad",
        )?;
        check_scene_layout(program.layout())?;

        let world_loc = program.uniform_location(WORLD_MATRIX, UniformKind::Matrix4)?;
        let tex_loc = program.uniform_location(TEXTURE, UniformKind::Texture2d)?;
        let sampler_loc = program.sampler_for(TEXTURE)?;

        let world = MatrixUniform::new(rctx.device, world_loc, WORLD_MATRIX)?;

        let bind_group = program.bind_group(
            rctx.device,
            world_loc.group,
            &[
                world.bind_group_entry(),
                wgpu::BindGroupEntry {
                    binding: tex_loc.binding,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: sampler_loc.binding,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
            "textured quad bind group",
        )?;

        let mut transform = Transform2D::new();
        transform.set_scale(config.scale);
        transform.set_position(config.position);

        Ok(Self {
            bind_group,
            world,
            program,
            texture,
            shape,
            transform,
            rotation: config.rotation,
            clear: config.clear_color,
        })
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    pub fn update(&mut self, time: &FrameTime) {
        self.rotation.advance(&mut self.transform, time);
    }

    /// Uploads the world matrix and records one clear + draw pass.
    pub fn draw(&self, rctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.world.write(rctx.queue, self.transform.matrix());

        let mut rpass = target.begin_pass("textured quad pass", Some(self.clear), rctx.viewport);
        rpass.set_pipeline(self.program.pipeline());
        rpass.set_bind_group(self.world.location().group, &self.bind_group, &[]);
        self.shape.draw(&mut rpass);
    }

    pub fn texture_size(&self) -> (u32, u32) {
        self.texture.size()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> DemoConfig {
        let defaults = DemoConfig::default();
        let mut cfg = defaults.clone();
        for (src, dst) in [
            (&defaults.texture_path, &mut cfg.texture_path),
            (&defaults.vertex_shader_path, &mut cfg.vertex_shader_path),
            (&defaults.fragment_shader_path, &mut cfg.fragment_shader_path),
        ] {
            let copy = dir.path().join(src.file_name().unwrap());
            fs::copy(src, &copy).unwrap();
            *dst = copy;
        }
        cfg
    }

    // ── bundled resources ─────────────────────────────────────────────────

    #[test]
    fn bundled_resources_load_and_link() {
        let sources = SceneSources::load(&DemoConfig::default()).unwrap();
        let layout = sources.check().unwrap();

        let world = layout.resolve(WORLD_MATRIX, UniformKind::Matrix4).unwrap();
        let tex = layout.resolve(TEXTURE, UniformKind::Texture2d).unwrap();
        let sampler = layout
            .resolve(&format!("{TEXTURE}{SAMPLER_SUFFIX}"), UniformKind::Sampler)
            .unwrap();
        assert_eq!(world.group, tex.group);
        assert_eq!(tex.group, sampler.group);
    }

    #[test]
    fn bundled_texture_is_upright() {
        let sources = SceneSources::load(&DemoConfig::default()).unwrap();
        let img = &sources.image;
        let wrap = WrapMode::ClampToEdge;

        // Picture: red top-left, green top-right, blue bottom-left, white bottom-right.
        assert_eq!(img.sample_nearest(0.0, 1.0, wrap), [255, 0, 0, 255]);
        assert_eq!(img.sample_nearest(1.0, 1.0, wrap), [0, 255, 0, 255]);
        assert_eq!(img.sample_nearest(0.0, 0.0, wrap), [0, 0, 255, 255]);
        assert_eq!(img.sample_nearest(1.0, 0.0, wrap), [255, 255, 255, 255]);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn missing_texture_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(&dir);
        cfg.texture_path = dir.path().join("missing.png");

        match SceneSources::load(&cfg) {
            Err(ResourceError::FileNotFound { path }) => assert_eq!(path, cfg.texture_path),
            other => panic!("expected FileNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn corrupt_texture_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        fs::write(&cfg.texture_path, b"not an image").unwrap();

        assert!(matches!(
            SceneSources::load(&cfg),
            Err(ResourceError::Decode { .. })
        ));
    }

    #[test]
    fn missing_shader_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(&dir);
        cfg.fragment_shader_path = dir.path().join("nope.wgsl");

        assert!(matches!(
            SceneSources::load(&cfg),
            Err(ResourceError::FileNotFound { .. })
        ));
    }

    #[test]
    fn broken_shader_is_compile_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        fs::write(&cfg.vertex_shader_path, "@vertex fn vs_main( -> {").unwrap();

        match SceneSources::load(&cfg) {
            Err(ResourceError::Compile { stage, .. }) => assert_eq!(stage, "vertex"),
            other => panic!("expected Compile, got {:?}", other.err()),
        }
    }

    #[test]
    fn renamed_uniform_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let text = fs::read_to_string(&cfg.vertex_shader_path).unwrap();
        fs::write(&cfg.vertex_shader_path, text.replace("worldMatrix", "model")).unwrap();

        let sources = SceneSources::load(&cfg).unwrap();
        match sources.check() {
            Err(ResourceError::UniformNotFound { name }) => assert_eq!(name, WORLD_MATRIX),
            other => panic!("expected UniformNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn texture_in_a_second_group_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let text = fs::read_to_string(&cfg.fragment_shader_path).unwrap();
        fs::write(
            &cfg.fragment_shader_path,
            text.replace("@group(0) @binding(1)", "@group(1) @binding(1)"),
        )
        .unwrap();

        let sources = SceneSources::load(&cfg).unwrap();
        match sources.check() {
            Err(ResourceError::Link { message }) => assert!(message.contains("one bind group")),
            other => panic!("expected Link, got {:?}", other.err()),
        }
    }

    #[test]
    fn extra_binding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let text = fs::read_to_string(&cfg.fragment_shader_path).unwrap();
        let extra = "@group(0) @binding(3) var<uniform> tint: vec4<f32>;\n";
        let text = text.replace(
            "textureSample(tex, tex_sampler, uv) * color",
            "textureSample(tex, tex_sampler, uv) * color * tint",
        );
        fs::write(&cfg.fragment_shader_path, format!("{extra}{text}")).unwrap();

        let sources = SceneSources::load(&cfg).unwrap();
        assert!(matches!(sources.check(), Err(ResourceError::Link { .. })));
    }
}
