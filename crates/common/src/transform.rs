//! Position, rotation and scale for one entity or camera.
//!
//! Derived state (the world matrix, its inverse-transpose and the orientation
//! basis) is cached behind two dirty flags and rebuilt lazily the next time it
//! is read. Readers of cached state therefore take `&mut self`; a transform has
//! exactly one owner and is never shared.
//!
//! Conventions are left-handed: `+Z` is forward, `+Y` is up, `+X` is right.
//! Rotation is stored as pitch (about X), yaw (about Y) and roll (about Z) in
//! radians and composed as roll, then pitch, then yaw.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Determinant magnitude below which the world matrix is treated as singular.
const SINGULAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    scale: Vec3,
    pitch_yaw_roll: Vec3,
    world: Mat4,
    world_inverse_transpose: Mat4,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    matrix_dirty: bool,
    vectors_dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            pitch_yaw_roll: Vec3::ZERO,
            world: Mat4::IDENTITY,
            world_inverse_transpose: Mat4::IDENTITY,
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::Z,
            matrix_dirty: false,
            vectors_dirty: false,
        }
    }
}

impl Transform {
    /// Identity transform: origin, no rotation, unit scale.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_rotation(mut self, pitch_yaw_roll: Vec3) -> Self {
        self.set_rotation(pitch_yaw_roll);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    // --- Setters ---

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.matrix_dirty = true;
    }

    pub fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_position(Vec3::new(x, y, z));
    }

    /// Overwrite pitch, yaw and roll (radians). Angles are not wrapped.
    pub fn set_rotation(&mut self, pitch_yaw_roll: Vec3) {
        self.pitch_yaw_roll = pitch_yaw_roll;
        self.matrix_dirty = true;
        self.vectors_dirty = true;
    }

    pub fn set_rotation_xyz(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.set_rotation(Vec3::new(pitch, yaw, roll));
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.matrix_dirty = true;
    }

    pub fn set_scale_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_scale(Vec3::new(x, y, z));
    }

    // --- Movers ---

    /// Translate along the world axes.
    pub fn move_absolute(&mut self, offset: Vec3) {
        self.set_position(self.position + offset);
    }

    /// Translate along the transform's own axes.
    ///
    /// The offset is rotated by an orientation built from the current angles,
    /// not from the cached basis, so a rotation set earlier in the same frame
    /// is always honoured.
    pub fn move_relative(&mut self, offset: Vec3) {
        let rotated = self.orientation() * offset;
        self.set_position(self.position + rotated);
    }

    /// Add to the current pitch, yaw and roll.
    pub fn rotate(&mut self, delta: Vec3) {
        self.set_rotation(self.pitch_yaw_roll + delta);
    }

    /// Multiply the current scale component-wise.
    pub fn scale_by(&mut self, factors: Vec3) {
        self.set_scale(self.scale * factors);
    }

    // --- Plain getters ---

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pitch_yaw_roll(&self) -> Vec3 {
        self.pitch_yaw_roll
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Orientation quaternion for the current pitch, yaw and roll.
    pub fn orientation(&self) -> Quat {
        let Vec3 {
            x: pitch,
            y: yaw,
            z: roll,
        } = self.pitch_yaw_roll;
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll)
    }

    // --- Cached state ---

    /// Local-to-world matrix: scale, then rotate, then translate.
    pub fn world_matrix(&mut self) -> Mat4 {
        self.update_matrices();
        self.world
    }

    /// Inverse-transpose of the world matrix, for transforming normals.
    ///
    /// A singular world matrix (zero scale on any axis) yields the identity
    /// rather than a matrix full of infinities.
    pub fn world_inverse_transpose_matrix(&mut self) -> Mat4 {
        self.update_matrices();
        self.world_inverse_transpose
    }

    pub fn right(&mut self) -> Vec3 {
        self.update_vectors();
        self.right
    }

    pub fn up(&mut self) -> Vec3 {
        self.update_vectors();
        self.up
    }

    pub fn forward(&mut self) -> Vec3 {
        self.update_vectors();
        self.forward
    }

    /// Whether the next matrix read will recompute.
    pub fn is_matrix_dirty(&self) -> bool {
        self.matrix_dirty
    }

    /// Whether the next basis-vector read will recompute.
    pub fn are_vectors_dirty(&self) -> bool {
        self.vectors_dirty
    }

    fn update_matrices(&mut self) {
        if !self.matrix_dirty {
            return;
        }
        let world =
            Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position);
        self.world = world;
        self.world_inverse_transpose = if world.determinant().abs() < SINGULAR_EPSILON {
            tracing::trace!("singular world matrix, using identity inverse-transpose");
            Mat4::IDENTITY
        } else {
            world.inverse().transpose()
        };
        self.matrix_dirty = false;
    }

    fn update_vectors(&mut self) {
        if !self.vectors_dirty {
            return;
        }
        let orientation = self.orientation();
        self.right = orientation * Vec3::X;
        self.up = orientation * Vec3::Y;
        self.forward = orientation * Vec3::Z;
        self.vectors_dirty = false;
    }
}
