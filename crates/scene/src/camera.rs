use glam::{Mat4, Vec2, Vec3};
use prism_common::Transform;
use prism_input::{InputSnapshot, MoveAction};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

pub const DEFAULT_NEAR_CLIP: f32 = 0.01;
pub const DEFAULT_FAR_CLIP: f32 = 1000.0;

/// Pitch is kept this far inside straight up/down so the view direction never
/// lines up with the world up vector.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// `|forward . up|` above `1 - GIMBAL_EPSILON` switches the view to the
/// camera's own up vector.
const GIMBAL_EPSILON: f32 = 1e-4;

/// How the camera projects view space onto the clip volume.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Perspective,
    /// Parallel projection showing `height` world units vertically.
    Orthographic { height: f32 },
}

/// First-person camera with a left-handed view and projection.
///
/// The view matrix is refreshed by [`Camera::update`] and
/// [`Camera::update_view_matrix`] only. Moving the transform directly leaves
/// it stale until one of those is called.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    aspect_ratio: f32,
    field_of_view: f32,
    near_clip: f32,
    far_clip: f32,
    movement_speed: f32,
    look_speed: f32,
    projection_kind: Projection,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Camera at `position` looking down `+Z`.
    ///
    /// `field_of_view` is vertical, in radians. `look_speed` is radians of
    /// rotation per unit of pointer movement.
    pub fn new(
        aspect_ratio: f32,
        position: Vec3,
        movement_speed: f32,
        look_speed: f32,
        field_of_view: f32,
    ) -> Self {
        let mut camera = Self {
            transform: Transform::new().with_position(position),
            aspect_ratio,
            field_of_view,
            near_clip: DEFAULT_NEAR_CLIP,
            far_clip: DEFAULT_FAR_CLIP,
            movement_speed,
            look_speed,
            projection_kind: Projection::Perspective,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix(aspect_ratio, field_of_view);
        camera
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near_clip = near;
        self.far_clip = far;
        self.update_projection_matrix(self.aspect_ratio, self.field_of_view);
        self
    }

    pub fn with_projection(mut self, kind: Projection) -> Self {
        self.projection_kind = kind;
        self.update_projection_matrix(self.aspect_ratio, self.field_of_view);
        self
    }

    /// Starting orientation as pitch, yaw and roll in radians.
    pub fn with_rotation(mut self, pitch_yaw_roll: Vec3) -> Self {
        self.transform.set_rotation(pitch_yaw_roll);
        self.update_view_matrix();
        self
    }

    /// Rebuild the projection. Call on resize and whenever the FOV changes.
    pub fn update_projection_matrix(&mut self, aspect_ratio: f32, field_of_view: f32) {
        self.aspect_ratio = aspect_ratio;
        self.field_of_view = field_of_view;
        self.projection = match self.projection_kind {
            Projection::Perspective => {
                Mat4::perspective_lh(field_of_view, aspect_ratio, self.near_clip, self.far_clip)
            }
            Projection::Orthographic { height } => {
                let half_h = height * 0.5;
                let half_w = half_h * aspect_ratio;
                Mat4::orthographic_lh(
                    -half_w,
                    half_w,
                    -half_h,
                    half_h,
                    self.near_clip,
                    self.far_clip,
                )
            }
        };
    }

    /// Rebuild the view from the transform's position and forward vector.
    pub fn update_view_matrix(&mut self) {
        let position = self.transform.position();
        let forward = self.transform.forward();
        let up = if forward.dot(Vec3::Y).abs() > 1.0 - GIMBAL_EPSILON {
            self.transform.up()
        } else {
            Vec3::Y
        };
        self.view = Mat4::look_to_lh(position, forward, up);
    }

    /// Apply one frame of movement and look input, then refresh the view.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) {
        let step = self.movement_speed * dt;

        if input.is_held(MoveAction::Forward) {
            self.transform.move_relative(Vec3::new(0.0, 0.0, step));
        }
        if input.is_held(MoveAction::Backward) {
            self.transform.move_relative(Vec3::new(0.0, 0.0, -step));
        }
        if input.is_held(MoveAction::Right) {
            self.transform.move_relative(Vec3::new(step, 0.0, 0.0));
        }
        if input.is_held(MoveAction::Left) {
            self.transform.move_relative(Vec3::new(-step, 0.0, 0.0));
        }
        if input.is_held(MoveAction::Up) {
            self.transform.move_absolute(Vec3::new(0.0, step, 0.0));
        }
        if input.is_held(MoveAction::Down) {
            self.transform.move_absolute(Vec3::new(0.0, -step, 0.0));
        }

        if input.look_active() {
            self.look(input.pointer_delta());
        }

        self.update_view_matrix();
    }

    /// Turn by a pointer delta: horizontal motion yaws, vertical motion pitches.
    fn look(&mut self, pointer_delta: Vec2) {
        if pointer_delta == Vec2::ZERO {
            return;
        }
        let delta = pointer_delta * self.look_speed;
        self.transform.rotate(Vec3::new(delta.y, delta.x, 0.0));

        let mut rotation = self.transform.pitch_yaw_roll();
        if rotation.x.abs() > PITCH_LIMIT {
            rotation.x = rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.transform.set_rotation(rotation);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Direct access to the transform. The view is stale until the next
    /// [`Camera::update_view_matrix`] or [`Camera::update`].
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    pub fn set_field_of_view(&mut self, field_of_view: f32) {
        self.update_projection_matrix(self.aspect_ratio, field_of_view);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.update_projection_matrix(aspect_ratio, self.field_of_view);
    }

    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    pub fn far_clip(&self) -> f32 {
        self.far_clip
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn look_speed(&self) -> f32 {
        self.look_speed
    }

    pub fn projection_kind(&self) -> Projection {
        self.projection_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_4;

    const EPSILON: f32 = 1e-5;

    fn demo_camera() -> Camera {
        Camera::new(16.0 / 9.0, Vec3::new(0.0, 0.0, -5.0), 5.0, 0.01, FRAC_PI_4)
    }

    #[test]
    fn construction_derives_both_matrices() {
        let cam = demo_camera();
        assert_ne!(cam.view_matrix(), Mat4::IDENTITY);
        assert_ne!(cam.projection_matrix(), Mat4::IDENTITY);
        // The origin sits 5 units in front of the camera.
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPSILON), "got {p:?}");
    }

    #[test]
    fn perspective_matches_closed_form() {
        let aspect = 16.0 / 9.0;
        let fov = FRAC_PI_4;
        let cam = demo_camera().with_clip_planes(0.01, 1000.0);
        let proj = cam.projection_matrix();

        let y_scale = 1.0 / (fov * 0.5).tan();
        let x_scale = y_scale / aspect;
        assert!((proj.col(0).x - x_scale).abs() < EPSILON);
        assert!((proj.col(1).y - y_scale).abs() < EPSILON);

        let range = 1000.0 / (1000.0 - 0.01);
        assert!((proj.col(2).z - range).abs() < EPSILON);
        // Left-handed: clip w carries +z.
        assert_eq!(proj.col(2).w, 1.0);
    }

    #[test]
    fn near_and_far_map_to_depth_range() {
        let cam = demo_camera().with_clip_planes(0.01, 1000.0);
        let proj = cam.projection_matrix();
        let near = proj * Vec4::new(0.0, 0.0, 0.01, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, 1000.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn update_projection_tracks_aspect_and_fov() {
        let mut cam = demo_camera();
        cam.update_projection_matrix(1.0, 1.2);
        assert_eq!(cam.aspect_ratio(), 1.0);
        assert_eq!(cam.field_of_view(), 1.2);
        let proj = cam.projection_matrix();
        assert!((proj.col(0).x - proj.col(1).y).abs() < EPSILON);

        cam.set_aspect_ratio(2.0);
        assert_eq!(cam.field_of_view(), 1.2);
        assert!((cam.projection_matrix().col(0).x * 2.0 - proj.col(1).y).abs() < EPSILON);
    }

    #[test]
    fn forward_key_for_one_second_reaches_origin() {
        let mut cam = demo_camera();
        let input = InputSnapshot::idle().with_held(MoveAction::Forward);
        cam.update(1.0, &input);
        assert!(
            cam.position().abs_diff_eq(Vec3::ZERO, EPSILON),
            "got {:?}",
            cam.position()
        );
    }

    #[test]
    fn strafe_and_vertical_movement() {
        let mut cam = demo_camera().with_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        let input = InputSnapshot::idle()
            .with_held(MoveAction::Right)
            .with_held(MoveAction::Up);
        cam.update(0.5, &input);
        // Facing +X, so right is -Z; up is always world +Y.
        let expected = Vec3::new(0.0, 2.5, -7.5);
        assert!(
            cam.position().abs_diff_eq(expected, EPSILON),
            "got {:?}",
            cam.position()
        );
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut cam = demo_camera();
        let input = InputSnapshot::idle()
            .with_held(MoveAction::Forward)
            .with_held(MoveAction::Backward)
            .with_held(MoveAction::Left)
            .with_held(MoveAction::Right);
        cam.update(1.0, &input);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), EPSILON));
    }

    #[test]
    fn look_only_while_active() {
        let mut cam = demo_camera();
        cam.update(0.016, &InputSnapshot::idle());
        assert_eq!(cam.transform().pitch_yaw_roll(), Vec3::ZERO);

        cam.update(0.016, &InputSnapshot::idle().with_look(Vec2::new(10.0, 5.0)));
        let r = cam.transform().pitch_yaw_roll();
        assert!((r.y - 0.1).abs() < EPSILON);
        assert!((r.x - 0.05).abs() < EPSILON);
    }

    #[test]
    fn update_refreshes_view() {
        let mut cam = demo_camera();
        cam.update(0.0, &InputSnapshot::idle().with_look(Vec2::new(100.0, 0.0)));
        let mut expected_t = cam.transform().clone();
        let expected = Mat4::look_to_lh(expected_t.position(), expected_t.forward(), Vec3::Y);
        assert!(cam.view_matrix().abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn view_is_stale_until_refreshed() {
        let mut cam = demo_camera();
        let before = cam.view_matrix();
        cam.transform_mut().move_absolute(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(cam.view_matrix(), before);
        cam.update_view_matrix();
        assert_ne!(cam.view_matrix(), before);
    }

    #[test]
    fn pitch_is_clamped_under_large_look() {
        let mut cam = demo_camera();
        cam.update(0.016, &InputSnapshot::idle().with_look(Vec2::new(0.0, 10_000.0)));
        assert!((cam.transform().pitch_yaw_roll().x - PITCH_LIMIT).abs() < EPSILON);
        assert!(!cam.view_matrix().is_nan());

        cam.update(0.016, &InputSnapshot::idle().with_look(Vec2::new(0.0, -50_000.0)));
        assert!((cam.transform().pitch_yaw_roll().x + PITCH_LIMIT).abs() < EPSILON);
        assert!(!cam.view_matrix().is_nan());
    }

    #[test]
    fn straight_down_view_is_finite() {
        let mut cam = demo_camera();
        cam.transform_mut().set_rotation(Vec3::new(FRAC_PI_2, 0.0, 0.0));
        cam.update_view_matrix();
        let view = cam.view_matrix();
        assert!(view.is_finite());
        // Looking down, a point below the camera is straight ahead.
        let below = view.transform_point3(Vec3::new(0.0, -3.0, -5.0));
        assert!(below.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-4), "got {below:?}");
    }

    #[test]
    fn orthographic_projection() {
        let cam = Camera::new(2.0, Vec3::ZERO, 1.0, 0.01, FRAC_PI_4)
            .with_projection(Projection::Orthographic { height: 10.0 });
        let proj = cam.projection_matrix();
        assert!((proj.col(1).y - 0.2).abs() < EPSILON);
        assert!((proj.col(0).x - 0.1).abs() < EPSILON);
        assert_eq!(proj.col(3).w, 1.0);
    }
}
