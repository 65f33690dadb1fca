use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::error::ConfigError;
use crate::lighting::{LightSet, Material};

/// Viewer settings read from a JSON file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub material: Material,
    pub lights: LightSet,
}

impl ViewerConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::debug!(
            "loaded viewer configuration from {} ({} lights)",
            path.display(),
            config.lights.sources().len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::lighting::LightKind;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.camera.fov_degrees, 90.0);
        assert_eq!(config.material.shininess, 150.0);
        assert_eq!(config.lights.sources().len(), 4);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "camera": { "fov_degrees": 60.0, "eye": [0.0, 1.0, -8.0] },
                "material": { "shininess": 32.0 },
                "lights": [
                    { "kind": "directional", "vector": [0.0, -1.0, 0.0], "color": [1.0, 1.0, 1.0] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.eye, Vec3::new(0.0, 1.0, -8.0));
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.material.shininess, 32.0);
        assert_eq!(config.material.ambient, Vec3::splat(0.2));
        assert_eq!(config.lights.sources().len(), 1);
        assert_eq!(config.lights.sources()[0].kind, LightKind::Directional);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ViewerConfig::from_json_str("{ \"camera\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "camera": {{ "max_scale": 4.0 }} }}"#).unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.max_scale, 4.0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ViewerConfig::load("/nonexistent/viewer.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("viewer.json")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
