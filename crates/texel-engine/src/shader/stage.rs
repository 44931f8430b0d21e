use std::path::{Path, PathBuf};

use crate::error::{ResourceError, ResourceResult};

/// Pipeline stage a source file is compiled for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub fn wgpu(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

/// WGSL source text for one stage.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub stage: ShaderStage,
    pub text: String,
}

impl ShaderSource {
    /// Reads the whole file as UTF-8 text.
    pub fn from_file(path: impl AsRef<Path>, stage: ShaderStage) -> ResourceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ResourceError::from_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            stage,
            text,
        })
    }

    /// Source held in memory; `name` is used in diagnostics in place of a path.
    pub fn from_text(name: &str, stage: ShaderStage, text: &str) -> Self {
        Self {
            path: PathBuf::from(name),
            stage,
            text: text.to_string(),
        }
    }

    /// Parses and validates the source, then locates its entry point.
    ///
    /// Validation here accepts every naga capability; whether the device
    /// supports what the shader uses is checked when the program is linked.
    pub fn compile(self) -> ResourceResult<CompiledShader> {
        let compile_err = |message: String| ResourceError::Compile {
            path: self.path.clone(),
            stage: self.stage.name(),
            message,
        };

        let module = naga::front::wgsl::parse_str(&self.text)
            .map_err(|e| compile_err(e.emit_to_string(&self.text)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| compile_err(error_chain(&e)))?;

        let entry_point = module
            .entry_points
            .iter()
            .position(|ep| ep.stage == self.stage.naga())
            .ok_or_else(|| compile_err(format!("no @{} entry point", self.stage.name())))?;

        log::debug!(
            "compiled {} shader {} (entry `{}`)",
            self.stage.name(),
            self.path.display(),
            module.entry_points[entry_point].name
        );

        Ok(CompiledShader {
            source: self,
            module,
            entry_point,
        })
    }
}

/// Validated shader stage, ready to be linked.
#[derive(Debug)]
pub struct CompiledShader {
    source: ShaderSource,
    module: naga::Module,
    entry_point: usize,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.source.stage
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }

    pub fn text(&self) -> &str {
        &self.source.text
    }

    pub fn entry_point_name(&self) -> &str {
        &self.module.entry_points[self.entry_point].name
    }

    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry_point(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_point]
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(e) = cur {
        out.push_str(": ");
        out.push_str(&e.to_string());
        cur = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
@vertex
fn vs_main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 0.0, 1.0);
}
"#;

    #[test]
    fn compiles_and_finds_entry_point() {
        let shader = ShaderSource::from_text("vs", ShaderStage::Vertex, VS)
            .compile()
            .unwrap();
        assert_eq!(shader.entry_point_name(), "vs_main");
        assert_eq!(shader.stage(), ShaderStage::Vertex);
    }

    #[test]
    fn syntax_error_is_a_compile_error() {
        let err = ShaderSource::from_text("broken.wgsl", ShaderStage::Vertex, "fn (")
            .compile()
            .unwrap_err();
        match err {
            ResourceError::Compile { stage, path, .. } => {
                assert_eq!(stage, "vertex");
                assert_eq!(path, PathBuf::from("broken.wgsl"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn type_error_is_a_compile_error() {
        let src = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let x: f32 = vec2<f32>(1.0, 2.0);
    return vec4<f32>(x);
}
"#;
        let err = ShaderSource::from_text("fs", ShaderStage::Fragment, src)
            .compile()
            .unwrap_err();
        assert!(matches!(err, ResourceError::Compile { .. }));
    }

    #[test]
    fn wrong_stage_entry_point_is_rejected() {
        let err = ShaderSource::from_text("vs", ShaderStage::Fragment, VS)
            .compile()
            .unwrap_err();
        assert!(err.to_string().contains("no @fragment entry point"));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShaderSource::from_file(dir.path().join("vertex.wgsl"), ShaderStage::Vertex)
            .unwrap_err();
        assert!(matches!(err, ResourceError::FileNotFound { .. }));
    }

    #[test]
    fn reads_source_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vertex.wgsl");
        std::fs::write(&path, VS).unwrap();
        let src = ShaderSource::from_file(&path, ShaderStage::Vertex).unwrap();
        assert_eq!(src.text, VS);
        assert!(src.compile().is_ok());
    }
}
