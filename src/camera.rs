use std::f32::consts::PI;

use glam::{Mat3, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Projection and interaction constants for the viewer camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Model-space distance covered by a full-viewport pan.
    pub translate_rate: f32,
    pub wheel_zoom_speed: f32,
    pub pinch_zoom_speed: f32,
    pub max_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            translate_rate: 5.0,
            wheel_zoom_speed: 0.001,
            pinch_zoom_speed: 0.005,
            max_scale: 2.5,
        }
    }
}

impl CameraConfig {
    /// Lower scale bound reached through the mouse wheel.
    pub fn wheel_min_scale(&self) -> f32 {
        (self.wheel_zoom_speed * 10.0).min(self.max_scale)
    }

    /// Lower scale bound reached through a pinch gesture.
    pub fn pinch_min_scale(&self) -> f32 {
        (self.pinch_zoom_speed * 10.0).min(self.max_scale)
    }
}

/// Matrices derived from the camera for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    /// Accumulated model transform with the zoom scale applied.
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub normal: Mat4,
}

/// Persistent model transform and zoom level.
///
/// Interaction deltas are left-multiplied onto `model`, so each new gesture
/// acts in view-aligned axes regardless of the rotation already applied. The
/// eye never moves; zoom is a uniform scale applied on top of the model
/// transform when frame matrices are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    config: CameraConfig,
    model: Mat4,
    scale: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl CameraState {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            model: Mat4::IDENTITY,
            scale: 1.0_f32.min(config.max_scale),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Matrix uploaded as the view transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.config.eye, self.config.target, self.config.up).inverse()
    }

    /// Screen-aligned rotation axes in model space.
    pub fn view_axes(&self) -> (Vec3, Vec3) {
        let basis = Mat3::from_mat4(self.view_matrix().inverse());
        ((basis * Vec3::X).normalize(), (basis * Vec3::Y).normalize())
    }

    /// Rotates by a normalized-device-coordinate drag delta. A drag across
    /// the whole viewport turns the model by a full revolution.
    pub fn rotate(&mut self, delta: Vec2) {
        if !delta.is_finite() || delta == Vec2::ZERO {
            return;
        }
        let (x_axis, y_axis) = self.view_axes();
        let rotation = Mat4::from_axis_angle(y_axis, delta.x * PI)
            * Mat4::from_axis_angle(x_axis, -delta.y * PI);
        self.model = rotation * self.model;
    }

    /// Pans by a normalized-device-coordinate drag delta.
    pub fn translate(&mut self, delta: Vec2) {
        if !delta.is_finite() || delta == Vec2::ZERO {
            return;
        }
        let (x_axis, y_axis) = self.view_axes();
        let offset = (x_axis * delta.x + y_axis * delta.y) * self.config.translate_rate;
        self.model = Mat4::from_translation(offset) * self.model;
    }

    /// Applies a wheel delta; positive values zoom out. Returns `false` when
    /// the delta is not finite and the scale was left untouched.
    pub fn zoom_wheel(&mut self, delta_y: f32) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        let next = self.scale - delta_y * self.config.wheel_zoom_speed;
        self.scale = clamp_scale(next, self.config.wheel_min_scale(), self.config.max_scale);
        true
    }

    /// Applies the change in finger distance (pixels) of a pinch gesture.
    pub fn zoom_pinch(&mut self, delta_distance: f32) -> bool {
        if !delta_distance.is_finite() {
            return false;
        }
        let next = self.scale + delta_distance * self.config.pinch_zoom_speed;
        self.scale = clamp_scale(next, self.config.pinch_min_scale(), self.config.max_scale);
        true
    }

    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        Mat4::perspective_rh(
            self.config.fov_degrees.to_radians(),
            aspect,
            self.config.near,
            self.config.far,
        )
    }

    pub fn frame_matrices(&self, width: u32, height: u32) -> FrameMatrices {
        let model = self.model * Mat4::from_scale(Vec3::splat(self.scale));
        FrameMatrices {
            model,
            view: self.view_matrix(),
            projection: self.projection_matrix(width, height),
            normal: model.inverse().transpose(),
        }
    }
}

fn clamp_scale(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_close(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn assert_scale(camera: &CameraState, expected: f32) {
        assert!(
            (camera.scale() - expected).abs() < 1e-6,
            "expected scale {expected}, got {}",
            camera.scale()
        );
    }

    #[test]
    fn view_places_origin_in_front_of_camera() {
        let camera = CameraState::default();
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert_vec3_close(origin, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn view_axes_follow_screen() {
        let (x_axis, y_axis) = CameraState::default().view_axes();
        assert_vec3_close(x_axis, Vec3::NEG_X);
        assert_vec3_close(y_axis, Vec3::Y);
    }

    #[test]
    fn horizontal_drag_rotates_about_vertical_axis() {
        let mut camera = CameraState::default();
        camera.rotate(Vec2::new(0.5, 0.0));
        let turned = camera.model().transform_vector3(Vec3::X);
        assert_vec3_close(turned, Vec3::NEG_Z);
        assert_vec3_close(camera.model().transform_vector3(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn vertical_drag_rotates_about_horizontal_axis() {
        let mut camera = CameraState::default();
        camera.rotate(Vec2::new(0.0, 0.5));
        assert_vec3_close(camera.model().transform_vector3(Vec3::X), Vec3::X);
        assert_vec3_close(camera.model().transform_vector3(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn pan_moves_along_view_axes() {
        let mut camera = CameraState::default();
        camera.translate(Vec2::new(1.0, 0.0));
        assert_vec3_close(camera.model().w_axis.truncate(), Vec3::new(-5.0, 0.0, 0.0));
        camera.translate(Vec2::new(0.0, 1.0));
        assert_vec3_close(camera.model().w_axis.truncate(), Vec3::new(-5.0, 5.0, 0.0));
    }

    #[test]
    fn new_deltas_are_applied_after_existing_transform() {
        let mut camera = CameraState::default();
        camera.translate(Vec2::new(1.0, 0.0));
        camera.rotate(Vec2::new(0.5, 0.0));
        assert_vec3_close(camera.model().w_axis.truncate(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn wheel_scale_stays_in_range() {
        let mut camera = CameraState::default();
        for delta in [1.0e9, f32::MAX, 5.0, -3.0] {
            camera.zoom_wheel(delta);
            assert!((0.01..=2.5).contains(&camera.scale()), "{}", camera.scale());
        }
        camera.zoom_wheel(f32::MAX);
        assert_scale(&camera, 0.01);
        camera.zoom_wheel(-f32::MAX);
        assert_scale(&camera, 2.5);

        for delta in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(!camera.zoom_wheel(delta));
            assert_scale(&camera, 2.5);
        }
    }

    #[test]
    fn wheel_step_matches_speed() {
        let mut camera = CameraState::default();
        camera.zoom_wheel(100.0);
        assert_scale(&camera, 0.9);
    }

    #[test]
    fn pinch_scale_stays_in_range() {
        let mut camera = CameraState::default();
        camera.zoom_pinch(-1.0e12);
        assert_scale(&camera, 0.05);
        camera.zoom_pinch(f32::MAX);
        assert_scale(&camera, 2.5);
        assert!(!camera.zoom_pinch(f32::NAN));
        assert_scale(&camera, 2.5);

        camera.zoom_pinch(-300.0);
        assert_scale(&camera, 1.0);
    }

    #[test]
    fn zoom_floors_are_independent() {
        let config = CameraConfig::default();
        assert!((config.wheel_min_scale() - 0.01).abs() < 1e-6);
        assert!((config.pinch_min_scale() - 0.05).abs() < 1e-6);

        let mut camera = CameraState::new(config);
        camera.zoom_wheel(f32::MAX);
        assert_scale(&camera, 0.01);
        camera.zoom_pinch(0.0);
        assert_scale(&camera, 0.05);
    }

    #[test]
    fn projection_falls_back_to_square_aspect() {
        let camera = CameraState::default();
        assert_eq!(camera.projection_matrix(640, 0), camera.projection_matrix(1, 1));
        assert_ne!(camera.projection_matrix(640, 480), camera.projection_matrix(1, 1));
    }

    #[test]
    fn normal_matrix_is_inverse_transpose_of_scaled_model() {
        let mut camera = CameraState::default();
        camera.rotate(Vec2::new(0.3, -0.2));
        camera.translate(Vec2::new(0.1, 0.4));
        camera.zoom_wheel(400.0);
        let frame = camera.frame_matrices(800, 600);
        let product = frame.normal.transpose() * frame.model;
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4), "{product:?}");
        assert_eq!(
            frame.model,
            camera.model() * Mat4::from_scale(Vec3::splat(camera.scale()))
        );
    }
}
