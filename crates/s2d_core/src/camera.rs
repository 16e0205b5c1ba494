use glam::{Mat4, Vec2};

/// Fixed orthographic 2D camera. The visible world spans
/// `position ± half_extents` with depth in `near..far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub near: f32,
    pub far: f32,
}

impl Camera2D {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::new(half_width, half_height),
            near: -1.0,
            far: 1.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation((-self.position).extend(0.0))
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            -self.half_extents.x,
            self.half_extents.x,
            -self.half_extents.y,
            self.half_extents.y,
            self.near,
            self.far,
        )
    }
}

impl Default for Camera2D {
    /// 10 x 7.5 world units, matching a 4:3 window.
    fn default() -> Self {
        Self::new(5.0, 3.75)
    }
}
