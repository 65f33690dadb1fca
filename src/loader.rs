use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::document::Document;
use crate::error::LoadError;
use crate::glb::{parse_glb, ChunkHeader, GlbHeader};

const ACCEPTED_EXTENSIONS: [&str; 2] = ["glb", "gif"];

/// Rejects file names without a `.glb` or `.gif` extension (any case).
pub fn check_extension(name: &str) -> Result<(), LoadError> {
    let accepted = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false);
    if accepted {
        Ok(())
    } else {
        Err(LoadError::ExtensionRejected {
            name: name.to_string(),
        })
    }
}

/// Validated model container held in memory.
#[derive(Debug, Clone)]
pub struct ModelFile {
    label: String,
    data: Arc<[u8]>,
    header: GlbHeader,
    document: Document,
    binary_header: ChunkHeader,
    binary_offset: usize,
    binary_range: Range<usize>,
}

impl ModelFile {
    /// Checks the extension, then reads and validates the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        check_extension(&path.to_string_lossy())?;
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(label, data)
    }

    /// Validates bytes already resident in memory.
    pub fn from_bytes(label: impl Into<String>, data: Vec<u8>) -> Result<Self, LoadError> {
        let label = label.into();
        let data: Arc<[u8]> = Arc::from(data.into_boxed_slice());
        let asset = parse_glb(&data)?;
        let header = asset.header;
        let document = asset.metadata.document;
        let binary_header = asset.binary.header;
        let binary_offset = asset.binary.offset;
        let binary_range = asset.binary.payload_range();

        let model = Self {
            label,
            data,
            header,
            document,
            binary_header,
            binary_offset,
            binary_range,
        };
        let meshes = model.meshes();
        info!(
            "loaded {} ({} bytes, {} mesh(es))",
            model.label,
            model.data.len(),
            meshes.len()
        );
        for mesh in &meshes {
            info!("  mesh {mesh}");
        }
        Ok(model)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn header(&self) -> GlbHeader {
        self.header
    }

    pub fn metadata(&self) -> &Document {
        &self.document
    }

    pub fn binary_payload(&self) -> &[u8] {
        &self.data[self.binary_range.clone()]
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            label: self.label.clone(),
            version: self.header.version,
            declared_length: self.header.total_length,
            byte_length: self.data.len(),
            binary_offset: self.binary_offset,
            binary_length: self.binary_header.length,
            meshes: self.meshes(),
        }
    }

    fn meshes(&self) -> Vec<MeshSummary> {
        let Ok(meshes) = self.document.root().field("meshes") else {
            return Vec::new();
        };
        let Ok(items) = meshes.items() else {
            return Vec::new();
        };
        items
            .map(|mesh| MeshSummary {
                name: mesh
                    .field("name")
                    .and_then(|name| name.as_str().map(str::to_owned))
                    .ok(),
                primitive_count: mesh
                    .field("primitives")
                    .and_then(|primitives| primitives.as_array().map(<[_]>::len))
                    .unwrap_or(0),
            })
            .collect()
    }
}

/// Printable description of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub label: String,
    pub version: u32,
    pub declared_length: u32,
    pub byte_length: usize,
    pub binary_offset: usize,
    pub binary_length: u32,
    pub meshes: Vec<MeshSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSummary {
    pub name: Option<String>,
    pub primitive_count: usize,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("<unnamed>");
        write!(f, "{name} ({} primitive(s))", self.primitive_count)
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loaded model {}", self.label)?;
        writeln!(f, "  glTF version: {}", self.version)?;
        writeln!(
            f,
            "  length: {} bytes (header declares {})",
            self.byte_length, self.declared_length
        )?;
        writeln!(
            f,
            "  binary chunk: {} bytes at offset {}",
            self.binary_length, self.binary_offset
        )?;
        write!(f, "  meshes: {}", self.meshes.len())?;
        for mesh in &self.meshes {
            write!(f, "\n   - {mesh}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::tests::{build_glb, CUBE_METADATA};
    use serde_json::json;
    use std::io::Write;
    use tempfile::Builder;

    fn write_model(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn accepts_glb_and_gif_in_any_case() {
        for name in ["cube.glb", "CUBE.GLB", "scene.Gif", "dir.v2/model.gLb"] {
            assert!(check_extension(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["cube.gltf", "cube", "glb", "cube.glb.txt", ".glb.zip"] {
            match check_extension(name) {
                Err(LoadError::ExtensionRejected { name: rejected }) => assert_eq!(rejected, name),
                other => panic!("expected rejection for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn extension_is_checked_before_reading() {
        let err = ModelFile::open("/nonexistent/dir/model.obj").unwrap_err();
        assert!(matches!(err, LoadError::ExtensionRejected { .. }), "{err}");

        let err = ModelFile::open("/nonexistent/dir/model.glb").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "{err}");
    }

    #[test]
    fn opens_model_from_disk() {
        let binary = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let file = write_model(".glb", &build_glb(&CUBE_METADATA, &binary));
        let model = ModelFile::open(file.path()).unwrap();
        assert_eq!(model.binary_payload(), &binary);
        assert_eq!(model.header().version, 2);
        assert!(model.label().ends_with(".glb"));
        assert_eq!(model.metadata().value(), &*CUBE_METADATA);
    }

    #[test]
    fn format_errors_pass_through() {
        let mut bytes = build_glb(&CUBE_METADATA, &[]);
        bytes[0] = b'x';
        let file = write_model(".gif", &bytes);
        match ModelFile::open(file.path()) {
            Err(LoadError::Format(err)) => assert_eq!(err.code(), "bad-magic-or-version"),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn summary_lists_meshes() {
        let metadata = json!({
            "meshes": [
                { "name": "Body", "primitives": [{}, {}] },
                { "primitives": [{}] }
            ]
        });
        let bytes = build_glb(&metadata, &[0u8; 12]);
        let model = ModelFile::from_bytes("memory.glb", bytes.clone()).unwrap();
        let summary = model.summary();
        assert_eq!(summary.byte_length, bytes.len());
        assert_eq!(summary.declared_length as usize, bytes.len());
        assert_eq!(summary.binary_length, 12);
        assert_eq!(summary.binary_offset, bytes.len() - 12 - 8);
        assert_eq!(
            summary.meshes,
            vec![
                MeshSummary {
                    name: Some("Body".into()),
                    primitive_count: 2
                },
                MeshSummary {
                    name: None,
                    primitive_count: 1
                },
            ]
        );

        let text = summary.to_string();
        assert!(text.starts_with("Loaded model memory.glb"));
        assert!(text.contains("  meshes: 2"));
        assert!(text.contains("   - Body (2 primitive(s))"));
        assert!(text.contains("   - <unnamed> (1 primitive(s))"));
    }
}
