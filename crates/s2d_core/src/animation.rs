/// Horizontal speed shared by both sprites, in world units per second.
pub const UNITS_PER_SECOND: f32 = 1.0;
/// Spin rate of the secondary sprite.
pub const DEGREES_PER_SECOND: f32 = 90.0;

/// Cumulative animation state. Both values only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationParams {
    pub x_offset: f32,
    pub rotation_deg: f32,
}

impl AnimationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Negative deltas are treated as zero.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.x_offset += UNITS_PER_SECOND * dt;
        self.rotation_deg += DEGREES_PER_SECOND * dt;
    }
}
