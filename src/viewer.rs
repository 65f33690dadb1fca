use log::trace;

use crate::camera::{CameraState, FrameMatrices};
use crate::config::ViewerConfig;
use crate::error::RenderError;
use crate::input::{GestureTracker, InputEvent, Viewport};
use crate::lighting::{LightSet, Material};

pub use crate::render::uniforms::FrameUniforms;

/// Drawing surface driven by [`SceneRenderer`].
pub trait RenderBackend {
    /// Adapts size-dependent resources to a new surface size.
    fn resize(&mut self, width: u32, height: u32);

    /// Uploads the frame uniforms and draws the scene once.
    fn draw(&mut self, frame: &FrameUniforms) -> Result<(), RenderError>;
}

/// Platform-neutral viewer core. Owns the camera, lights and gesture state
/// and decides when a frame is drawn; the GPU sits behind [`RenderBackend`].
pub struct SceneRenderer<B> {
    backend: B,
    camera: CameraState,
    gestures: GestureTracker,
    lights: LightSet,
    material: Material,
    viewport: Viewport,
    needs_redraw: bool,
}

impl<B: RenderBackend> SceneRenderer<B> {
    /// The first tick always draws.
    pub fn new(backend: B, config: ViewerConfig, viewport: Viewport) -> Self {
        Self {
            backend,
            camera: CameraState::new(config.camera),
            gestures: GestureTracker::new(),
            lights: config.lights,
            material: config.material,
            viewport,
            needs_redraw: true,
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let changed = self.gestures.apply(event, self.viewport, &mut self.camera);
        if changed {
            trace!("input {event:?} changed the view");
            self.needs_redraw = true;
        }
        changed
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport =
            Viewport::new(width, height).with_scale_factor(self.viewport.scale_factor);
        self.backend.resize(width, height);
        self.needs_redraw = true;
    }

    /// Physical pixels per logical pixel; only affects pinch sensitivity.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.viewport = self.viewport.with_scale_factor(scale_factor);
    }

    pub fn set_lights(&mut self, lights: LightSet) {
        self.lights = lights;
        self.needs_redraw = true;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
        self.needs_redraw = true;
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Draws one frame if anything changed since the last tick. Returns
    /// whether a frame was drawn. The redraw flag is cleared before drawing,
    /// so a failed frame is not retried until the next change.
    pub fn tick(&mut self) -> Result<bool, RenderError> {
        if !std::mem::take(&mut self.needs_redraw) {
            return Ok(false);
        }
        let frame = self.frame_uniforms();
        self.backend.draw(&frame)?;
        Ok(true)
    }

    pub fn frame_matrices(&self) -> FrameMatrices {
        self.camera
            .frame_matrices(self.viewport.width, self.viewport.height)
    }

    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms::new(&self.frame_matrices(), &self.lights, &self.material)
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
