//! Reflection over compiled naga modules.

use naga::{AddressSpace, Binding, ImageClass, ImageDimension, Scalar, TypeInner, VectorSize};

/// What a named shader global is, as far as binding it is concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformKind {
    /// `var<uniform> m: mat4x4<f32>`
    Matrix4,
    /// Any other `var<uniform>` block.
    UniformBuffer,
    /// `texture_2d<f32>`
    Texture2d,
    Sampler,
    ComparisonSampler,
    Unsupported,
}

impl UniformKind {
    pub fn name(self) -> &'static str {
        match self {
            UniformKind::Matrix4 => "mat4x4<f32> uniform",
            UniformKind::UniformBuffer => "uniform buffer",
            UniformKind::Texture2d => "texture_2d<f32>",
            UniformKind::Sampler => "sampler",
            UniformKind::ComparisonSampler => "sampler_comparison",
            UniformKind::Unsupported => "unsupported resource",
        }
    }

    pub(crate) fn binding_type(self) -> Option<wgpu::BindingType> {
        match self {
            UniformKind::Matrix4 | UniformKind::UniformBuffer => Some(wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            }),
            UniformKind::Texture2d => Some(wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            }),
            UniformKind::Sampler => {
                Some(wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering))
            }
            UniformKind::ComparisonSampler => {
                Some(wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison))
            }
            UniformKind::Unsupported => None,
        }
    }
}

/// Resolved bind slot of a named uniform.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    pub kind: UniformKind,
    /// Stages whose module declares the global.
    pub visibility: wgpu::ShaderStages,
}

/// A bound global declared by one module.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoundGlobal {
    pub name: Option<String>,
    pub group: u32,
    pub binding: u32,
    pub kind: UniformKind,
}

/// All globals with a `@group/@binding` attribute.
pub(crate) fn bound_globals(module: &naga::Module) -> Vec<BoundGlobal> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            Some(BoundGlobal {
                name: var.name.clone(),
                group: rb.group,
                binding: rb.binding,
                kind: classify(var.space, &module.types[var.ty].inner),
            })
        })
        .collect()
}

fn classify(space: AddressSpace, inner: &TypeInner) -> UniformKind {
    match (space, inner) {
        (
            AddressSpace::Uniform,
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            },
        ) if *scalar == Scalar::F32 => UniformKind::Matrix4,
        (AddressSpace::Uniform, _) => UniformKind::UniformBuffer,
        (
            AddressSpace::Handle,
            TypeInner::Image {
                dim: ImageDimension::D2,
                arrayed: false,
                class: ImageClass::Sampled { multi: false, .. },
            },
        ) => UniformKind::Texture2d,
        (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => UniformKind::Sampler,
        (AddressSpace::Handle, TypeInner::Sampler { comparison: true }) => {
            UniformKind::ComparisonSampler
        }
        _ => UniformKind::Unsupported,
    }
}

/// Component shape of a stage input/output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct IoType {
    pub components: u8,
    pub scalar: Scalar,
}

impl IoType {
    fn of(inner: &TypeInner) -> Option<Self> {
        match *inner {
            TypeInner::Scalar(scalar) => Some(Self { components: 1, scalar }),
            TypeInner::Vector { size, scalar } => Some(Self {
                components: vector_len(size),
                scalar,
            }),
            _ => None,
        }
    }

    pub fn describe(self) -> String {
        let base = match self.scalar {
            Scalar::F32 => "f32",
            Scalar::I32 => "i32",
            Scalar::U32 => "u32",
            _ => "scalar",
        };
        if self.components == 1 {
            base.to_string()
        } else {
            format!("vec{}<{base}>", self.components)
        }
    }
}

fn vector_len(size: VectorSize) -> u8 {
    match size {
        VectorSize::Bi => 2,
        VectorSize::Tri => 3,
        VectorSize::Quad => 4,
    }
}

/// `@location` slots read by the entry point, with their types.
pub(crate) fn entry_inputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<(u32, Option<IoType>)> {
    let mut out = Vec::new();
    for arg in &ep.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

/// `@location` slots written by the entry point, with their types.
pub(crate) fn entry_outputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<(u32, Option<IoType>)> {
    let mut out = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<(u32, Option<IoType>)>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location { location, .. }) => out.push((*location, IoType::of(inner))),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}
