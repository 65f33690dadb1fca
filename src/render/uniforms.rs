use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::FrameMatrices;
use crate::lighting::{LightSet, LightSource, Material, MAX_LIGHTS_PER_KIND};

/// Transform block bound at `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl From<&FrameMatrices> for GlobalUniform {
    fn from(matrices: &FrameMatrices) -> Self {
        Self {
            model: matrices.model.to_cols_array_2d(),
            view: matrices.view.to_cols_array_2d(),
            projection: matrices.projection.to_cols_array_2d(),
            normal: matrices.normal.to_cols_array_2d(),
        }
    }
}

/// Lighting block bound at `@group(0) @binding(1)`. Array slots past the
/// active count are zeroed and never read by the shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub point_positions: [[f32; 4]; MAX_LIGHTS_PER_KIND],
    pub point_colors: [[f32; 4]; MAX_LIGHTS_PER_KIND],
    pub directional_vectors: [[f32; 4]; MAX_LIGHTS_PER_KIND],
    pub directional_colors: [[f32; 4]; MAX_LIGHTS_PER_KIND],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// Specular color in `xyz`, shininess in `w`.
    pub specular: [f32; 4],
    /// Active positional and directional light counts in `x` and `y`.
    pub counts: [u32; 4],
}

impl LightUniform {
    pub fn new(lights: &LightSet, material: &Material) -> Self {
        let mut uniform = Self::zeroed();
        let point_count = pack(
            lights.positional(),
            &mut uniform.point_positions,
            &mut uniform.point_colors,
        );
        let directional_count = pack(
            lights.directional(),
            &mut uniform.directional_vectors,
            &mut uniform.directional_colors,
        );
        uniform.ambient = material.ambient.extend(1.0).into();
        uniform.diffuse = material.diffuse.extend(1.0).into();
        uniform.specular = material.specular.extend(material.shininess).into();
        uniform.counts = [point_count, directional_count, 0, 0];
        uniform
    }

    pub fn point_count(&self) -> u32 {
        self.counts[0]
    }

    pub fn directional_count(&self) -> u32 {
        self.counts[1]
    }
}

fn pack<'a>(
    lights: impl Iterator<Item = &'a LightSource>,
    vectors: &mut [[f32; 4]; MAX_LIGHTS_PER_KIND],
    colors: &mut [[f32; 4]; MAX_LIGHTS_PER_KIND],
) -> u32 {
    let mut count = 0;
    for (slot, light) in lights.take(MAX_LIGHTS_PER_KIND).enumerate() {
        vectors[slot] = light.vector.extend(0.0).into();
        colors[slot] = light.color.extend(1.0).into();
        count += 1;
    }
    count
}

/// Everything the backend uploads before drawing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub global: GlobalUniform,
    pub lights: LightUniform,
}

impl FrameUniforms {
    pub fn new(matrices: &FrameMatrices, lights: &LightSet, material: &Material) -> Self {
        Self {
            global: GlobalUniform::from(matrices),
            lights: LightUniform::new(lights, material),
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.global.model)
    }

    pub fn point_light(&self, slot: usize) -> Option<(Vec3, Vec3)> {
        if slot >= self.lights.point_count() as usize {
            return None;
        }
        let position = Vec3::from_slice(&self.lights.point_positions[slot]);
        let color = Vec3::from_slice(&self.lights.point_colors[slot]);
        Some((position, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;
    use std::mem::size_of;

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(size_of::<GlobalUniform>(), 256);
        assert_eq!(size_of::<LightUniform>(), 4 * 20 * 16 + 3 * 16 + 16);
        assert_eq!(size_of::<LightUniform>() % 16, 0);
    }

    #[test]
    fn packs_lights_by_kind_with_counts() {
        let uniform = LightUniform::new(&LightSet::default(), &Material::default());
        assert_eq!(uniform.point_count(), 3);
        assert_eq!(uniform.directional_count(), 1);
        assert_eq!(uniform.point_positions[2], [2.0, 2.0, 2.0, 0.0]);
        assert_eq!(uniform.directional_vectors[0], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(uniform.point_positions[3], [0.0; 4]);
        assert_eq!(uniform.specular, [1.0, 1.0, 1.0, 150.0]);
    }

    #[test]
    fn empty_light_set_uploads_zero_counts() {
        let uniform = LightUniform::new(&LightSet::empty(), &Material::default());
        assert_eq!(uniform.counts, [0, 0, 0, 0]);
    }

    #[test]
    fn frame_uniforms_carry_matrices() {
        let camera = CameraState::default();
        let matrices = camera.frame_matrices(800, 600);
        let frame = FrameUniforms::new(&matrices, &LightSet::default(), &Material::default());
        assert_eq!(frame.model(), matrices.model);
        assert_eq!(frame.global.view, matrices.view.to_cols_array_2d());
        let (position, color) = frame.point_light(1).unwrap();
        assert_eq!(position, Vec3::ZERO);
        assert_eq!(color, Vec3::new(0.8, 0.7, 0.5));
        assert!(frame.point_light(3).is_none());
    }
}
