use bytemuck::{Pod, Zeroable};

/// Interleaved vertex consumed by the shading pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl CubeVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub const CUBE_VERTEX_COUNT: usize = 36;

struct Face {
    normal: [f32; 3],
    color: [f32; 3],
    corners: [[f32; 3]; 4],
}

// Corners wind counter-clockwise seen from outside the cube.
const FACES: [Face; 6] = [
    Face {
        normal: [0.0, 0.0, 1.0],
        color: [1.0, 0.0, 0.0],
        corners: [
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ],
    },
    Face {
        normal: [0.0, 0.0, -1.0],
        color: [0.0, 1.0, 0.0],
        corners: [
            [1.0, -1.0, -1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
        ],
    },
    Face {
        normal: [0.0, 1.0, 0.0],
        color: [0.0, 0.0, 1.0],
        corners: [
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
        ],
    },
    Face {
        normal: [0.0, -1.0, 0.0],
        color: [1.0, 1.0, 0.0],
        corners: [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0],
            [-1.0, -1.0, 1.0],
        ],
    },
    Face {
        normal: [1.0, 0.0, 0.0],
        color: [1.0, 0.0, 1.0],
        corners: [
            [1.0, -1.0, 1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
        ],
    },
    Face {
        normal: [-1.0, 0.0, 0.0],
        color: [0.0, 1.0, 1.0],
        corners: [
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
        ],
    },
];

/// Two triangles per face, flat normals, one color per face.
pub fn cube_vertices() -> Vec<CubeVertex> {
    let mut vertices = Vec::with_capacity(CUBE_VERTEX_COUNT);
    for face in &FACES {
        for corner in [0, 1, 2, 0, 2, 3] {
            vertices.push(CubeVertex {
                position: face.corners[corner],
                normal: face.normal,
                color: face.color,
            });
        }
    }
    vertices
}
