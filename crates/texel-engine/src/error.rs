//! Resource acquisition errors.
//!
//! Every external resource (image file, shader file, uniform slot, geometry)
//! is acquired through a `ResourceResult`. None of these have a recovery
//! path; callers propagate them up to startup, which aborts.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading or building a GPU resource.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("texture load failed for {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("image {} has no pixels", path.display())]
    EmptyImage { path: PathBuf },

    #[error("invalid pixel buffer: {message}")]
    PixelBuffer { message: String },

    #[error("texture load failed for `{label}`: {width}x{height} exceeds the device limit of {max} texels per side")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("texture load failed for `{label}`: {message}")]
    TextureUpload { label: String, message: String },

    #[error("{stage} shader {} failed to compile:\n{message}", path.display())]
    Compile {
        path: PathBuf,
        stage: &'static str,
        message: String,
    },

    #[error("shader program link failed: {message}")]
    Link { message: String },

    #[error("uniform `{name}` not found in shader program")]
    UniformNotFound { name: String },

    #[error("uniform `{name}` has the wrong kind: expected {expected}, found {found}")]
    UniformKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid geometry: {message}")]
    InvalidGeometry { message: String },
}

pub type ResourceResult<T> = Result<T, ResourceError>;

impl ResourceError {
    /// Maps an I/O failure on `path` to `FileNotFound` or `Io`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ResourceError::FileNotFound { path }
        } else {
            ResourceError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_io_maps_to_file_not_found() {
        let err = ResourceError::from_io(
            "missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ResourceError::FileNotFound { .. }));
        assert_eq!(err.to_string(), "file not found: missing.png");
    }

    #[test]
    fn other_io_keeps_source() {
        let err = ResourceError::from_io(
            "locked.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ResourceError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
