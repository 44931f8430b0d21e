use std::collections::BTreeMap;

use crate::device::with_validation;
use crate::error::{ResourceError, ResourceResult};

use super::reflect::{bound_globals, entry_inputs, entry_outputs, IoType};
use super::{CompiledShader, ShaderStage, UniformKind, UniformLocation};

/// Suffix naming the sampler that a texture uniform is read through
/// (`tex` is sampled with `tex_sampler`).
pub const SAMPLER_SUFFIX: &str = "_sampler";

fn link_err(message: impl Into<String>) -> ResourceError {
    ResourceError::Link {
        message: message.into(),
    }
}

/// Bind slots of a linked program, addressable by uniform name.
#[derive(Debug, Clone, Default)]
pub struct ProgramLayout {
    slots: BTreeMap<(u32, u32), (Option<String>, UniformLocation)>,
}

impl ProgramLayout {
    /// Looks up `name` and checks it is a `expected` resource.
    pub fn resolve(&self, name: &str, expected: UniformKind) -> ResourceResult<UniformLocation> {
        let loc = self
            .slots
            .values()
            .find(|(n, _)| n.as_deref() == Some(name))
            .map(|(_, loc)| *loc)
            .ok_or_else(|| ResourceError::UniformNotFound {
                name: name.to_string(),
            })?;

        if loc.kind != expected {
            return Err(ResourceError::UniformKind {
                name: name.to_string(),
                expected: expected.name(),
                found: loc.kind.name(),
            });
        }
        Ok(loc)
    }

    /// Number of bind groups the pipeline layout needs (highest group + 1).
    pub fn group_count(&self) -> u32 {
        self.slots.keys().map(|(g, _)| g + 1).max().unwrap_or(0)
    }

    fn layout_entries(&self, group: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.slots
            .values()
            .filter(|(_, loc)| loc.group == group)
            .filter_map(|(_, loc)| {
                Some(wgpu::BindGroupLayoutEntry {
                    binding: loc.binding,
                    visibility: loc.visibility,
                    ty: loc.kind.binding_type()?,
                    count: None,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Checks that two compiled stages form a valid program.
///
/// - every vertex `@location` input is fed by `vertex_attributes` with the
///   same component count and scalar type
/// - every fragment `@location` input is written by the vertex stage with the
///   same type
/// - a `@group/@binding` slot declared by both stages has the same kind
pub fn check_link(
    vertex: &CompiledShader,
    fragment: &CompiledShader,
    vertex_attributes: &[wgpu::VertexAttribute],
) -> ResourceResult<ProgramLayout> {
    if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
        return Err(link_err(format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.stage().name(),
            fragment.stage().name()
        )));
    }

    for (location, ty) in entry_inputs(vertex.module(), vertex.entry_point()) {
        let attr = vertex_attributes
            .iter()
            .find(|a| a.shader_location == location)
            .ok_or_else(|| link_err(format!("vertex input @location({location}) has no vertex attribute")))?;

        let ty = ty.ok_or_else(|| {
            link_err(format!("vertex input @location({location}) is not a scalar or vector"))
        })?;
        match attribute_type(attr.format) {
            Some(fed) if fed == ty => {}
            _ => {
                return Err(link_err(format!(
                    "vertex input @location({location}) is {} but the attribute format is {:?}",
                    ty.describe(),
                    attr.format
                )));
            }
        }
    }

    let produced = entry_outputs(vertex.module(), vertex.entry_point());
    for (location, ty) in entry_inputs(fragment.module(), fragment.entry_point()) {
        match produced.iter().find(|(l, _)| *l == location) {
            None => {
                return Err(link_err(format!(
                    "fragment input @location({location}) is not written by the vertex stage"
                )));
            }
            Some((_, out_ty)) if *out_ty != ty => {
                return Err(link_err(format!(
                    "@location({location}) type mismatch: vertex writes {}, fragment reads {}",
                    describe(*out_ty),
                    describe(ty)
                )));
            }
            Some(_) => {}
        }
    }

    let mut layout = ProgramLayout::default();
    for shader in [vertex, fragment] {
        let stage = shader.stage();
        for global in bound_globals(shader.module()) {
            if global.kind == UniformKind::Unsupported {
                return Err(link_err(format!(
                    "{} shader binds an unsupported resource at @group({}) @binding({})",
                    stage.name(),
                    global.group,
                    global.binding
                )));
            }

            let key = (global.group, global.binding);
            match layout.slots.get_mut(&key) {
                Some((_, existing)) if existing.kind != global.kind => {
                    return Err(link_err(format!(
                        "@group({}) @binding({}) is a {} in one stage and a {} in the {} stage",
                        global.group,
                        global.binding,
                        existing.kind.name(),
                        global.kind.name(),
                        stage.name()
                    )));
                }
                Some((_, existing)) => existing.visibility |= stage.wgpu(),
                None => {
                    layout.slots.insert(
                        key,
                        (
                            global.name,
                            UniformLocation {
                                group: global.group,
                                binding: global.binding,
                                kind: global.kind,
                                visibility: stage.wgpu(),
                            },
                        ),
                    );
                }
            }
        }
    }

    Ok(layout)
}

fn describe(ty: Option<IoType>) -> String {
    ty.map_or_else(|| "a non-vector type".to_string(), IoType::describe)
}

fn attribute_type(format: wgpu::VertexFormat) -> Option<IoType> {
    use naga::Scalar;
    use wgpu::VertexFormat as F;

    let (components, scalar) = match format {
        F::Float32 => (1, Scalar::F32),
        F::Float32x2 => (2, Scalar::F32),
        F::Float32x3 => (3, Scalar::F32),
        F::Float32x4 => (4, Scalar::F32),
        F::Uint32 => (1, Scalar::U32),
        F::Uint32x2 => (2, Scalar::U32),
        F::Uint32x3 => (3, Scalar::U32),
        F::Uint32x4 => (4, Scalar::U32),
        F::Sint32 => (1, Scalar::I32),
        F::Sint32x2 => (2, Scalar::I32),
        F::Sint32x3 => (3, Scalar::I32),
        F::Sint32x4 => (4, Scalar::I32),
        _ => return None,
    };
    Some(IoType { components, scalar })
}

/// Linked vertex + fragment program: a render pipeline plus its resolved
/// bind slots.
///
/// Dropping the program releases the pipeline, its layout and the bind group
/// layouts.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    layout: ProgramLayout,
}

impl ShaderProgram {
    /// Links two compiled stages into a triangle-list pipeline rendering
    /// into `target_format`.
    pub fn link(
        device: &wgpu::Device,
        vertex: &CompiledShader,
        fragment: &CompiledShader,
        vertex_layout: wgpu::VertexBufferLayout<'static>,
        target_format: wgpu::TextureFormat,
        label: &str,
    ) -> ResourceResult<Self> {
        let layout = check_link(vertex, fragment, vertex_layout.attributes)?;

        let vs_module = create_module(device, vertex, label)?;
        let fs_module = create_module(device, fragment, label)?;

        let ((bind_group_layouts, pipeline), error) = with_validation(device, || {
            let bind_group_layouts: Vec<wgpu::BindGroupLayout> = (0..layout.group_count())
                .map(|group| {
                    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some(&format!("{label} bgl {group}")),
                        entries: &layout.layout_entries(group),
                    })
                })
                .collect();
            let bgl_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{label} pipeline layout")),
                bind_group_layouts: &bgl_refs,
                immediate_size: 0,
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(vertex.entry_point_name()),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some(fragment.entry_point_name()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

            (bind_group_layouts, pipeline)
        });
        if let Some(err) = error {
            return Err(link_err(format!("device rejected pipeline `{label}`: {err}")));
        }

        log::info!(
            "shader program `{label}` linked: {} + {}, {} bind slot(s) in {} group(s)",
            vertex.path().display(),
            fragment.path().display(),
            layout.len(),
            layout.group_count()
        );

        Ok(Self {
            pipeline,
            bind_group_layouts,
            layout,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    /// Resolves a uniform by name; a missing name is an error.
    pub fn uniform_location(
        &self,
        name: &str,
        expected: UniformKind,
    ) -> ResourceResult<UniformLocation> {
        let loc = self.layout.resolve(name, expected)?;
        log::debug!(
            "uniform `{name}` -> @group({}) @binding({})",
            loc.group,
            loc.binding
        );
        Ok(loc)
    }

    /// Resolves the sampler paired with the texture uniform `texture`.
    pub fn sampler_for(&self, texture: &str) -> ResourceResult<UniformLocation> {
        self.uniform_location(&format!("{texture}{SAMPLER_SUFFIX}"), UniformKind::Sampler)
    }

    /// Creates a bind group for `group` of this program's layout.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        group: u32,
        entries: &[wgpu::BindGroupEntry<'_>],
        label: &str,
    ) -> ResourceResult<wgpu::BindGroup> {
        let bgl = self
            .bind_group_layouts
            .get(group as usize)
            .ok_or_else(|| link_err(format!("program has no bind group {group}")))?;

        let expected = self.layout.layout_entries(group).len();
        if entries.len() != expected {
            return Err(link_err(format!(
                "bind group {group} needs {expected} entries, got {}",
                entries.len()
            )));
        }

        let (bind_group, error) = with_validation(device, || {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: bgl,
                entries,
            })
        });
        match error {
            Some(err) => Err(link_err(format!("bind group {group} rejected: {err}"))),
            None => Ok(bind_group),
        }
    }
}

/// Hands a validated stage to the device. The device may still reject it,
/// e.g. for a capability the adapter lacks.
fn create_module(
    device: &wgpu::Device,
    shader: &CompiledShader,
    label: &str,
) -> ResourceResult<wgpu::ShaderModule> {
    let stage = shader.stage().name();
    let (module, error) = with_validation(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} {stage} shader")),
            source: wgpu::ShaderSource::Wgsl(shader.text().into()),
        })
    });
    match error {
        Some(err) => Err(ResourceError::Compile {
            path: shader.path().to_path_buf(),
            stage,
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vertex;
    use crate::shader::ShaderSource;

    const VS: &str = r#"
@group(0) @binding(0) var<uniform> worldMatrix: mat4x4<f32>;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
) -> VsOut {
    var out: VsOut;
    out.clip = worldMatrix * vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    out.color = color;
    return out;
}
"#;

    const FS: &str = r#"
@group(0) @binding(1) var tex: texture_2d<f32>;
@group(0) @binding(2) var tex_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>, @location(1) color: vec4<f32>) -> @location(0) vec4<f32> {
    return textureSample(tex, tex_sampler, uv) * color;
}
"#;

    fn vs(src: &str) -> CompiledShader {
        ShaderSource::from_text("vs", ShaderStage::Vertex, src).compile().unwrap()
    }

    fn fs(src: &str) -> CompiledShader {
        ShaderSource::from_text("fs", ShaderStage::Fragment, src).compile().unwrap()
    }

    fn link(v: &str, f: &str) -> ResourceResult<ProgramLayout> {
        check_link(&vs(v), &fs(f), &Vertex::ATTRIBUTES)
    }

    // ── resolution ────────────────────────────────────────────────────────

    #[test]
    fn resolves_named_uniforms() {
        let layout = link(VS, FS).unwrap();
        assert_eq!(layout.group_count(), 1);

        let world = layout.resolve("worldMatrix", UniformKind::Matrix4).unwrap();
        assert_eq!((world.group, world.binding), (0, 0));
        assert_eq!(world.visibility, wgpu::ShaderStages::VERTEX);

        let tex = layout.resolve("tex", UniformKind::Texture2d).unwrap();
        assert_eq!((tex.group, tex.binding), (0, 1));

        let sampler = layout.resolve("tex_sampler", UniformKind::Sampler).unwrap();
        assert_eq!(sampler.binding, 2);
        assert_eq!(layout.layout_entries(0).len(), 3);
    }

    #[test]
    fn missing_uniform_is_reported_by_name() {
        let layout = link(VS, FS).unwrap();
        match layout.resolve("projection", UniformKind::Matrix4) {
            Err(ResourceError::UniformNotFound { name }) => assert_eq!(name, "projection"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let layout = link(VS, FS).unwrap();
        let err = layout.resolve("tex", UniformKind::Matrix4).unwrap_err();
        assert!(matches!(err, ResourceError::UniformKind { .. }));
    }

    #[test]
    fn shared_slot_merges_visibility() {
        let fs_shared = r#"
@group(0) @binding(0) var<uniform> worldMatrix: mat4x4<f32>;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return worldMatrix * vec4<f32>(uv, 0.0, 1.0);
}
"#;
        let layout = link(VS, fs_shared).unwrap();
        let world = layout.resolve("worldMatrix", UniformKind::Matrix4).unwrap();
        assert_eq!(
            world.visibility,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
    }

    // ── link errors ───────────────────────────────────────────────────────

    #[test]
    fn fragment_input_without_vertex_output_fails() {
        let fs_extra = r#"
@fragment
fn fs_main(@location(3) extra: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(extra, 0.0, 1.0);
}
"#;
        let err = link(VS, fs_extra).unwrap_err();
        assert!(matches!(err, ResourceError::Link { .. }));
        assert!(err.to_string().contains("@location(3)"));
    }

    #[test]
    fn interface_type_mismatch_fails() {
        let fs_vec4_uv = r#"
@fragment
fn fs_main(@location(0) uv: vec4<f32>) -> @location(0) vec4<f32> {
    return uv;
}
"#;
        assert!(matches!(
            link(VS, fs_vec4_uv).unwrap_err(),
            ResourceError::Link { .. }
        ));
    }

    #[test]
    fn vertex_input_without_attribute_fails() {
        let vs_extra = r#"
@vertex
fn vs_main(@location(5) normal: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(normal, 1.0);
}
"#;
        let fs_plain = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let err = link(vs_extra, fs_plain).unwrap_err();
        assert!(err.to_string().contains("no vertex attribute"));
    }

    #[test]
    fn vertex_input_format_mismatch_fails() {
        let vs_vec3 = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;
        let fs_plain = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        assert!(matches!(
            link(vs_vec3, fs_plain).unwrap_err(),
            ResourceError::Link { .. }
        ));
    }

    #[test]
    fn conflicting_slot_kinds_fail() {
        let fs_conflict = r#"
@group(0) @binding(0) var tex: texture_2d<f32>;
@group(0) @binding(2) var tex_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(tex, tex_sampler, uv);
}
"#;
        let err = link(VS, fs_conflict).unwrap_err();
        assert!(err.to_string().contains("@group(0) @binding(0)"));
    }

    #[test]
    fn swapped_stages_fail() {
        let err = check_link(&fs(FS), &vs(VS), &Vertex::ATTRIBUTES).unwrap_err();
        assert!(matches!(err, ResourceError::Link { .. }));
    }
}
