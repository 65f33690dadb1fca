use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacity of each light array in the fragment shader.
pub const MAX_LIGHTS_PER_KIND: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Positional,
    Directional,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positional => "positional",
            Self::Directional => "directional",
        })
    }
}

/// Single light. `vector` is a position for positional lights and a
/// direction for directional ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub kind: LightKind,
    pub vector: Vec3,
    pub color: Vec3,
}

impl LightSource {
    pub const fn positional(position: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Positional,
            vector: position,
            color,
        }
    }

    pub const fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            vector: direction,
            color,
        }
    }
}

/// Lights uploaded to the shader, at most [`MAX_LIGHTS_PER_KIND`] per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LightSource>", into = "Vec<LightSource>")]
pub struct LightSet {
    sources: Vec<LightSource>,
}

impl LightSet {
    pub fn new(sources: Vec<LightSource>) -> Result<Self, ConfigError> {
        for kind in [LightKind::Positional, LightKind::Directional] {
            let count = sources.iter().filter(|light| light.kind == kind).count();
            if count > MAX_LIGHTS_PER_KIND {
                return Err(ConfigError::TooManyLights {
                    kind,
                    count,
                    capacity: MAX_LIGHTS_PER_KIND,
                });
            }
        }
        Ok(Self { sources })
    }

    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn sources(&self) -> &[LightSource] {
        &self.sources
    }

    pub fn positional(&self) -> impl Iterator<Item = &LightSource> + '_ {
        self.of_kind(LightKind::Positional)
    }

    pub fn directional(&self) -> impl Iterator<Item = &LightSource> + '_ {
        self.of_kind(LightKind::Directional)
    }

    fn of_kind(&self, kind: LightKind) -> impl Iterator<Item = &LightSource> + '_ {
        self.sources.iter().filter(move |light| light.kind == kind)
    }
}

impl Default for LightSet {
    /// Three positional lights and one directional light.
    fn default() -> Self {
        let warm = Vec3::new(0.8, 0.7, 0.5);
        Self {
            sources: vec![
                LightSource::positional(Vec3::splat(-1.0), Vec3::ONE),
                LightSource::positional(Vec3::ZERO, warm),
                LightSource::positional(Vec3::splat(2.0), Vec3::ONE),
                LightSource::directional(Vec3::Z, warm),
            ],
        }
    }
}

impl TryFrom<Vec<LightSource>> for LightSet {
    type Error = ConfigError;

    fn try_from(sources: Vec<LightSource>) -> Result<Self, Self::Error> {
        Self::new(sources)
    }
}

impl From<LightSet> for Vec<LightSource> {
    fn from(set: LightSet) -> Self {
        set.sources
    }
}

/// Surface response shared by every fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::ONE,
            shininess: 150.0,
        }
    }
}

/// Interpolated fragment attributes, in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// CPU evaluation of the fragment shader's lighting sum.
pub fn shade_fragment(lights: &LightSet, material: &Material, fragment: &Fragment) -> Vec3 {
    let normal = fragment.normal.normalize_or_zero();
    let view_direction = (-fragment.position).normalize_or_zero();

    let mut ambient = Vec3::ZERO;
    let mut diffuse = Vec3::ZERO;
    let mut specular = Vec3::ZERO;
    for light in lights.positional().take(MAX_LIGHTS_PER_KIND) {
        let light_direction = (light.vector - fragment.position).normalize_or_zero();
        ambient += material.ambient * light.color * fragment.color;

        let lambert = light_direction.dot(normal).max(0.0);
        diffuse += lambert * material.diffuse * light.color * fragment.color;

        let reflected = reflect(-light_direction, normal);
        let highlight = view_direction
            .dot(reflected)
            .max(0.0)
            .powf(material.shininess);
        specular += material.specular * highlight * light.color;
    }

    let mut directional = Vec3::ZERO;
    for light in lights.directional().take(MAX_LIGHTS_PER_KIND) {
        let lambert = normal.dot(light.vector.normalize_or_zero()).max(0.0);
        directional += lambert * light.color * fragment.color;
    }

    ambient + diffuse + specular + directional
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}
