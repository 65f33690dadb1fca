//! Viewer for binary glTF (`.glb`) models.
//!
//! The crate validates the chunked container format and renders a lit cube
//! that users rotate, pan and zoom with mouse or touch gestures. Parsing,
//! lighting and camera state are plain Rust and run without a GPU; wgpu and
//! winit are confined to [`render`], [`app`] and the wasm entry points.

pub mod app;
pub mod camera;
pub mod config;
pub mod document;
pub mod error;
pub mod glb;
pub mod input;
pub mod lighting;
pub mod loader;
pub mod render;
pub mod viewer;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::ViewerApp;
pub use camera::{CameraConfig, CameraState, FrameMatrices};
pub use config::ViewerConfig;
pub use document::{Document, Node, ShapeError};
pub use error::{ConfigError, FormatError, LoadError, RenderError};
pub use glb::{parse_glb, GlbAsset, GlbHeader};
pub use input::{GestureTracker, InputEvent, MouseButton, Viewport};
pub use lighting::{shade_fragment, Fragment, LightKind, LightSet, LightSource, Material};
pub use loader::{check_extension, ModelFile, ModelSummary};
pub use render::Renderer;
pub use viewer::{FrameUniforms, RenderBackend, SceneRenderer};
