use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{error, warn};
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase,
    WindowEvent,
};
use winit::event_loop::ControlFlow;
use winit::window::Window;

use crate::config::ViewerConfig;
use crate::error::RenderError;
use crate::input::{InputEvent, MouseButton, Viewport};
use crate::render::Renderer;
use crate::viewer::SceneRenderer;

/// Pixels reported per wheel line, matching browser line scrolling.
pub const PIXELS_PER_LINE: f32 = 100.0;

/// Window-bound viewer driven by the winit event loop.
pub struct ViewerApp {
    scene: SceneRenderer<Renderer>,
    cursor: Vec2,
}

impl ViewerApp {
    pub fn new(renderer: Renderer, config: ViewerConfig) -> Self {
        let (width, height) = renderer.surface_size();
        let scale_factor = renderer.window().scale_factor() as f32;
        let viewport = Viewport::new(width, height).with_scale_factor(scale_factor);
        Self {
            scene: SceneRenderer::new(renderer, config, viewport),
            cursor: Vec2::ZERO,
        }
    }

    pub fn window(&self) -> &Window {
        self.scene.backend().window()
    }

    /// Processes one winit event. Errors are fatal for the event loop.
    pub fn handle_event(
        &mut self,
        event: &Event<'_, ()>,
        control_flow: &mut ControlFlow,
    ) -> Result<()> {
        let window_id = self.scene.backend().window_id();
        match event {
            Event::WindowEvent {
                event,
                window_id: id,
            } if *id == window_id => self.handle_window_event(event, control_flow),
            Event::RedrawRequested(id) if *id == window_id => self.redraw(),
            Event::MainEventsCleared => {
                if self.scene.needs_redraw() {
                    self.window().request_redraw();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_window_event(
        &mut self,
        event: &WindowEvent<'_>,
        control_flow: &mut ControlFlow,
    ) -> Result<()> {
        let input = match event {
            WindowEvent::CloseRequested => {
                control_flow.set_exit();
                None
            }
            WindowEvent::Resized(size) => {
                self.scene.resize(size.width, size.height);
                None
            }
            WindowEvent::ScaleFactorChanged {
                scale_factor,
                new_inner_size,
            } => {
                self.scene.set_scale_factor(*scale_factor as f32);
                self.scene.resize(new_inner_size.width, new_inner_size.height);
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(InputEvent::PointerMoved {
                    position: self.cursor,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button);
                Some(match state {
                    ElementState::Pressed => InputEvent::PointerPressed {
                        button,
                        position: self.cursor,
                    },
                    ElementState::Released => InputEvent::PointerReleased { button },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
                delta_y: wheel_delta_y(*delta, self.window().scale_factor()),
            }),
            WindowEvent::Touch(touch) => Some(touch_event(
                touch.phase,
                touch.id,
                Vec2::new(touch.location.x as f32, touch.location.y as f32),
            )),
            _ => None,
        };
        if let Some(input) = input {
            self.scene.handle_input(&input);
        }
        if self.scene.needs_redraw() {
            self.window().request_redraw();
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        match self.scene.tick() {
            Ok(_) => Ok(()),
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                let size = self.window().inner_size();
                self.scene.resize(size.width, size.height);
                self.window().request_redraw();
                Ok(())
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                warn!("surface timeout; frame skipped");
                Ok(())
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                Err(anyhow!("GPU is out of memory"))
            }
            Err(err) => {
                error!("frame failed: {err}");
                Err(err.into())
            }
        }
    }
}

/// Maps winit buttons onto DOM button numbering.
pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::LEFT,
        WinitMouseButton::Middle => MouseButton::MIDDLE,
        WinitMouseButton::Right => MouseButton::RIGHT,
        WinitMouseButton::Other(index) => {
            MouseButton::new(u8::try_from(index).unwrap_or(u8::MAX))
        }
    }
}

/// Converts a winit scroll delta into a DOM-style `deltaY` in logical
/// pixels, where positive values scroll down. Pixel deltas arrive in
/// physical pixels.
pub fn wheel_delta_y(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(position) => {
            let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
            (-position.y / scale_factor) as f32
        }
    }
}

/// Window size matching an element's CSS box. `None` while the element has
/// not been laid out, leaving winit's default size in place.
pub fn logical_surface_size(client_width: i32, client_height: i32) -> Option<LogicalSize<f64>> {
    (client_width > 0 && client_height > 0)
        .then(|| LogicalSize::new(f64::from(client_width), f64::from(client_height)))
}

pub fn touch_event(phase: TouchPhase, id: u64, position: Vec2) -> InputEvent {
    match phase {
        TouchPhase::Started => InputEvent::TouchStarted { id, position },
        TouchPhase::Moved => InputEvent::TouchMoved { id, position },
        TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::TouchEnded { id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn maps_winit_buttons_to_dom_numbering() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::LEFT);
        assert!(map_mouse_button(WinitMouseButton::Right).is_secondary());
        assert_eq!(map_mouse_button(WinitMouseButton::Middle).index(), 1);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(4)).index(), 4);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(900)).index(), u8::MAX);
    }

    #[test]
    fn scrolling_down_yields_positive_delta() {
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, -1.0), 1.0), 100.0);
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, 2.0), 1.0), -200.0);
        assert_eq!(
            wheel_delta_y(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -48.0)), 1.0),
            48.0
        );
    }

    #[test]
    fn pixel_scroll_is_converted_to_logical_pixels() {
        let physical = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -96.0));
        assert_eq!(wheel_delta_y(physical, 2.0), 48.0);
        assert_eq!(wheel_delta_y(physical, 3.0), 32.0);
        assert_eq!(wheel_delta_y(physical, 0.0), 96.0);
        // Line deltas do not depend on pixel density.
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, -1.0), 2.0), 100.0);
    }

    #[test]
    fn surface_size_follows_css_box() {
        assert_eq!(
            logical_surface_size(640, 360),
            Some(LogicalSize::new(640.0, 360.0))
        );
        assert_eq!(logical_surface_size(0, 360), None);
        assert_eq!(logical_surface_size(640, -1), None);
    }

    #[test]
    fn cancelled_touch_ends_gesture() {
        let at = Vec2::new(5.0, 6.0);
        assert_eq!(
            touch_event(TouchPhase::Started, 3, at),
            InputEvent::TouchStarted { id: 3, position: at }
        );
        assert_eq!(
            touch_event(TouchPhase::Cancelled, 3, at),
            InputEvent::TouchEnded { id: 3 }
        );
    }
}
