//! Scene state for the two animated sprites.
//!
//! Model matrices are rebuilt from the cumulative [`AnimationParams`] on every
//! update instead of being composed onto last frame's matrix, so the result
//! depends only on total elapsed time and cannot drift.

use glam::{Mat4, Vec3};

use crate::animation::AnimationParams;
use crate::camera::Camera2D;

/// Offset of the secondary sprite relative to the primary one.
pub const SECONDARY_OFFSET: Vec3 = Vec3::new(0.5, 0.5, 0.0);

/// Identity translated along X by `x_offset`.
pub fn primary_transform(x_offset: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x_offset, 0.0, 0.0))
}

/// Primary translation, then [`SECONDARY_OFFSET`], then a Z rotation about
/// the resulting pivot.
pub fn secondary_transform(x_offset: f32, rotation_deg: f32) -> Mat4 {
    primary_transform(x_offset)
        * Mat4::from_translation(SECONDARY_OFFSET)
        * Mat4::from_rotation_z(rotation_deg.to_radians())
}

pub struct SceneState {
    pub params: AnimationParams,
    view: Mat4,
    projection: Mat4,
    primary_model: Mat4,
    secondary_model: Mat4,
}

impl SceneState {
    pub fn new(camera: Camera2D) -> Self {
        let params = AnimationParams::new();
        Self {
            params,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            primary_model: primary_transform(params.x_offset),
            secondary_model: secondary_transform(params.x_offset, params.rotation_deg),
        }
    }

    /// Advance the animation by `dt` seconds and rebuild both model matrices.
    pub fn update(&mut self, dt: f32) {
        self.params.advance(dt);
        self.primary_model = primary_transform(self.params.x_offset);
        self.secondary_model = secondary_transform(self.params.x_offset, self.params.rotation_deg);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn primary_model(&self) -> Mat4 {
        self.primary_model
    }

    pub fn secondary_model(&self) -> Mat4 {
        self.secondary_model
    }

    /// Model matrices in draw order.
    pub fn model_matrices(&self) -> [Mat4; 2] {
        [self.primary_model, self.secondary_model]
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(Camera2D::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn translation_of(m: Mat4) -> Vec3 {
        m.w_axis.truncate()
    }

    #[test]
    fn primary_translation_follows_delta() {
        let mut scene = SceneState::default();
        scene.update(0.75);
        let prior_x = scene.params.x_offset;

        scene.update(0.25);
        assert_eq!(
            translation_of(scene.primary_model()),
            Vec3::new(prior_x + 0.25, 0.0, 0.0)
        );
    }

    #[test]
    fn zero_delta_leaves_matrices_unchanged() {
        let mut scene = SceneState::default();
        scene.update(0.4);
        let before = scene.model_matrices();
        scene.update(0.0);
        assert_eq!(scene.model_matrices(), before);
    }

    #[test]
    fn secondary_without_rotation_is_offset_primary() {
        let expected = primary_transform(1.5) * Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0));
        let actual = secondary_transform(1.5, 0.0);
        assert!(actual.abs_diff_eq(expected, 1e-6));
        assert_eq!(translation_of(actual), Vec3::new(2.0, 0.5, 0.0));
        assert_eq!(actual.x_axis, Vec4::X);
        assert_eq!(actual.y_axis, Vec4::Y);
    }

    #[test]
    fn rotation_pivots_around_secondary_position() {
        // A quarter turn keeps the pivot in place but maps local +X onto +Y.
        let m = secondary_transform(0.0, 90.0);
        let pivot = m.transform_point3(Vec3::ZERO);
        let tip = m.transform_point3(Vec3::X);
        assert!(pivot.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
        assert!(tip.abs_diff_eq(Vec3::new(0.5, 1.5, 0.0), 1e-6));
    }

    #[test]
    fn rotation_compares_mod_360() {
        let a = secondary_transform(0.0, 30.0);
        let b = secondary_transform(0.0, 390.0);
        assert!(a.abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn rotation_tracks_elapsed_time() {
        let mut scene = SceneState::default();
        for _ in 0..40 {
            scene.update(0.1);
        }
        assert!((scene.params.rotation_deg - 360.0).abs() < 1e-3);
        let expected = secondary_transform(scene.params.x_offset, 90.0 * 4.0);
        assert!(scene.secondary_model().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn delta_sequence_scenario() {
        let mut scene = SceneState::default();
        scene.update(0.0);
        scene.update(0.5);
        assert_eq!(scene.params.x_offset, 0.5);
        assert_eq!(scene.params.rotation_deg, 45.0);

        scene.update(0.5);
        assert_eq!(scene.params.x_offset, 1.0);
        assert_eq!(scene.params.rotation_deg, 90.0);
        assert!(scene
            .secondary_model()
            .abs_diff_eq(secondary_transform(1.0, 90.0), 1e-6));
    }

    #[test]
    fn matrices_do_not_depend_on_update_granularity() {
        let mut coarse = SceneState::default();
        coarse.update(1.0);

        let mut fine = SceneState::default();
        for _ in 0..4 {
            fine.update(0.25);
        }
        assert!(coarse.primary_model().abs_diff_eq(fine.primary_model(), 1e-6));
        assert!(coarse
            .secondary_model()
            .abs_diff_eq(fine.secondary_model(), 1e-5));
    }

    #[test]
    fn camera_matrices_stay_fixed() {
        let mut scene = SceneState::default();
        let view = scene.view_matrix();
        let projection = scene.projection_matrix();
        scene.update(3.0);
        assert_eq!(scene.view_matrix(), view);
        assert_eq!(scene.projection_matrix(), projection);
        assert_eq!(view, Mat4::IDENTITY);
    }
}
