use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;

/// Identifier for a mouse button using DOM numbering (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const MIDDLE: Self = Self(1);
    pub const RIGHT: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Secondary (right) button, which pans instead of rotating.
    pub fn is_secondary(self) -> bool {
        self == Self::RIGHT
    }
}

/// Platform-neutral pointer and touch events. Positions are in physical
/// pixels relative to the top-left corner of the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed { button: MouseButton, position: Vec2 },
    PointerMoved { position: Vec2 },
    PointerReleased { button: MouseButton },
    /// Wheel delta in DOM pixels; positive scrolls down.
    Wheel { delta_y: f32 },
    TouchStarted { id: u64, position: Vec2 },
    TouchMoved { id: u64, position: Vec2 },
    TouchEnded { id: u64 },
}

/// Size of the render surface in physical pixels, with the number of
/// physical pixels per logical (CSS) pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Non-positive or non-finite factors fall back to 1.
    pub fn with_scale_factor(self, scale_factor: f32) -> Self {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self {
            scale_factor,
            ..self
        }
    }

    /// Converts a physical pixel length into logical pixels.
    pub fn to_logical(&self, length: f32) -> f32 {
        length / self.scale_factor
    }

    /// Maps a pixel position to normalized device coordinates with +y up.
    pub fn to_ndc(&self, position: Vec2) -> Vec2 {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        Vec2::new(
            position.x / width * 2.0 - 1.0,
            -position.y / height * 2.0 + 1.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Rotating { last: Vec2 },
    Panning { last: Vec2 },
    TouchRotating { id: u64, last: Vec2 },
    Pinching {
        first: u64,
        second: u64,
        distance: f32,
        midpoint: Vec2,
    },
}

/// Converts pointer and touch events into camera updates.
///
/// A gesture ends on any button release or touch end; fingers still on the
/// surface at that point are ignored until another touch starts.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    gesture: Gesture,
    touches: Vec<(u64, Vec2)>,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureTracker {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            touches: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Normalized position the next drag delta is measured from; the origin
    /// while no gesture is active.
    pub fn reference_point(&self) -> Vec2 {
        match self.gesture {
            Gesture::Idle | Gesture::Pinching { .. } => Vec2::ZERO,
            Gesture::Rotating { last }
            | Gesture::Panning { last }
            | Gesture::TouchRotating { last, .. } => last,
        }
    }

    /// Applies one event. Returns `true` only when the camera changed and the
    /// frame needs to be redrawn.
    pub fn apply(
        &mut self,
        event: &InputEvent,
        viewport: Viewport,
        camera: &mut CameraState,
    ) -> bool {
        match *event {
            InputEvent::PointerPressed { button, position } => {
                let last = viewport.to_ndc(position);
                self.gesture = if button.is_secondary() {
                    Gesture::Panning { last }
                } else {
                    Gesture::Rotating { last }
                };
                false
            }
            InputEvent::PointerMoved { position } => {
                let current = viewport.to_ndc(position);
                match &mut self.gesture {
                    Gesture::Rotating { last } => {
                        camera.rotate(current - *last);
                        *last = current;
                        true
                    }
                    Gesture::Panning { last } => {
                        camera.translate(current - *last);
                        *last = current;
                        true
                    }
                    _ => false,
                }
            }
            InputEvent::PointerReleased { .. } => {
                self.gesture = Gesture::Idle;
                false
            }
            InputEvent::Wheel { delta_y } => camera.zoom_wheel(delta_y),
            InputEvent::TouchStarted { id, position } => {
                self.touch_started(id, position, viewport);
                false
            }
            InputEvent::TouchMoved { id, position } => {
                self.touch_moved(id, position, viewport, camera)
            }
            InputEvent::TouchEnded { id } => {
                self.touches.retain(|(touch, _)| *touch != id);
                self.gesture = Gesture::Idle;
                false
            }
        }
    }

    fn touch_started(&mut self, id: u64, position: Vec2, viewport: Viewport) {
        match self.touches.iter().position(|(touch, _)| *touch == id) {
            Some(index) => self.touches[index].1 = position,
            None => self.touches.push((id, position)),
        }
        self.gesture = match self.touches.as_slice() {
            [(only, at)] => Gesture::TouchRotating {
                id: *only,
                last: viewport.to_ndc(*at),
            },
            [(first, a), (second, b), ..] => Gesture::Pinching {
                first: *first,
                second: *second,
                distance: a.distance(*b),
                midpoint: viewport.to_ndc((*a + *b) * 0.5),
            },
            [] => Gesture::Idle,
        };
    }

    fn touch_moved(
        &mut self,
        id: u64,
        position: Vec2,
        viewport: Viewport,
        camera: &mut CameraState,
    ) -> bool {
        if let Some(entry) = self.touches.iter_mut().find(|(touch, _)| *touch == id) {
            entry.1 = position;
        }
        match self.gesture {
            Gesture::TouchRotating { id: active, last } if active == id => {
                let current = viewport.to_ndc(position);
                camera.rotate(current - last);
                self.gesture = Gesture::TouchRotating { id, last: current };
                true
            }
            Gesture::Pinching {
                first,
                second,
                distance,
                midpoint,
            } if id == first || id == second => {
                let (Some(a), Some(b)) = (self.touch_position(first), self.touch_position(second))
                else {
                    return false;
                };
                let new_distance = a.distance(b);
                let new_midpoint = viewport.to_ndc((a + b) * 0.5);
                camera.zoom_pinch(viewport.to_logical(new_distance - distance));
                camera.translate(new_midpoint - midpoint);
                self.gesture = Gesture::Pinching {
                    first,
                    second,
                    distance: new_distance,
                    midpoint: new_midpoint,
                };
                true
            }
            _ => false,
        }
    }

    fn touch_position(&self, id: u64) -> Option<Vec2> {
        self.touches
            .iter()
            .find(|(touch, _)| *touch == id)
            .map(|(_, position)| *position)
    }
}
