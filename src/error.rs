use std::path::PathBuf;

use crate::lighting::LightKind;

/// Structural failures raised while decoding a binary glTF container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("bad-magic-or-version: found magic {magic:#010x} version {version}")]
    BadMagicOrVersion { magic: u32, version: u32 },

    #[error("bad-metadata-chunk-type: found chunk type {found:#010x}, expected JSON")]
    BadMetadataChunkType { found: u32 },

    #[error("invalid-metadata-encoding: {0}")]
    InvalidMetadataEncoding(String),

    #[error("bad-binary-chunk-type: found chunk type {found:#010x}, expected BIN")]
    BadBinaryChunkType { found: u32 },

    #[error(
        "buffer-overrun: {region} needs bytes {offset}..{offset}+{length} but the buffer holds {available}"
    )]
    BufferOverrun {
        region: &'static str,
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("no-mesh-primitive: {0}")]
    NoMeshPrimitive(String),
}

impl FormatError {
    /// Stable identifier for the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadMagicOrVersion { .. } => "bad-magic-or-version",
            Self::BadMetadataChunkType { .. } => "bad-metadata-chunk-type",
            Self::InvalidMetadataEncoding(_) => "invalid-metadata-encoding",
            Self::BadBinaryChunkType { .. } => "bad-binary-chunk-type",
            Self::BufferOverrun { .. } => "buffer-overrun",
            Self::NoMeshPrimitive(_) => "no-mesh-primitive",
        }
    }
}

/// Errors surfaced by the model loading boundary.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("rejected file '{name}': only .glb and .gif extensions are accepted")]
    ExtensionRejected { name: String },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// GPU pipeline and per-frame failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(String),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    Device(String),

    #[error("surface exposes no supported texture format")]
    NoSurfaceFormat,

    #[error("shader failed to compile: {0}")]
    ShaderCompile(String),

    #[error("render pipeline failed to link: {0}")]
    PipelineLink(String),

    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Invalid viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{count} {kind} lights configured, at most {capacity} are supported")]
    TooManyLights {
        kind: LightKind,
        count: usize,
        capacity: usize,
    },

    #[error("invalid viewer configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_starts_with_code() {
        let errors = [
            FormatError::BadMagicOrVersion {
                magic: 0,
                version: 1,
            },
            FormatError::BadMetadataChunkType { found: 7 },
            FormatError::InvalidMetadataEncoding("eof".into()),
            FormatError::BadBinaryChunkType { found: 7 },
            FormatError::BufferOverrun {
                region: "binary chunk",
                offset: 20,
                length: 8,
                available: 24,
            },
            FormatError::NoMeshPrimitive("meshes is missing".into()),
        ];
        for err in errors {
            assert!(err.to_string().starts_with(err.code()), "{err}");
        }
    }
}
