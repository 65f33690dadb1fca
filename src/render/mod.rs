pub mod cube;
mod gpu;
pub(crate) mod shader;
pub mod uniforms;

pub use gpu::Renderer;
