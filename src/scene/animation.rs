use crate::Transform;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::f32::consts::PI;

/// Per-frame motion: a steady turn about Y and a gentle nod about X driven
/// by wall-clock time.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, SmartDefault)]
#[serde(default)]
pub struct Spin {
    /// Radians added to the Y rotation every frame.
    #[default(0.005)]
    pub yaw_step: f32,
    /// Peak X rotation in radians.
    #[default(0.1)]
    pub pitch_amplitude: f32,
    /// Angular frequency of the X rotation in radians per millisecond.
    #[default(0.001)]
    pub pitch_frequency: f64,
}

impl Spin {
    /// Advances `transform` by one frame at wall-clock time `now_ms`.
    ///
    /// The Y rotation is kept in `[0, 2π)`.
    pub fn apply(&self, transform: &mut Transform, now_ms: f64) {
        let yaw = transform.rotation[1] + self.yaw_step;

        transform.rotation[1] = yaw.rem_euclid(2.0 * PI);
        transform.rotation[0] = self.pitch_at(now_ms);
    }

    pub fn pitch_at(&self, now_ms: f64) -> f32 {
        // reduced in f64 since `Date.now()` is far too large for f32
        ((now_ms * self.pitch_frequency).sin() * f64::from(self.pitch_amplitude)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_accumulates_per_frame() {
        let spin = Spin::default();
        let mut transform = Transform::default();

        for frame in 0..200 {
            spin.apply(&mut transform, f64::from(frame) * 16.0);
        }

        assert!((transform.rotation[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn yaw_wraps_around() {
        let spin = Spin::default();
        let mut transform = Transform::default();

        let frames = 2000;

        for _ in 0..frames {
            spin.apply(&mut transform, 0.0);
        }

        let expected = (frames as f32 * 0.005).rem_euclid(2.0 * PI);

        assert!(transform.rotation[1] < 2.0 * PI);
        assert!((transform.rotation[1] - expected).abs() < 1e-3);
    }

    #[test]
    fn pitch_depends_only_on_time() {
        let spin = Spin::default();
        let mut transform = Transform::default();

        let now = 1_600_000_000_123.0;

        spin.apply(&mut transform, now);
        let first = transform.rotation[0];

        for _ in 0..10 {
            spin.apply(&mut transform, now);
        }

        assert_eq!(transform.rotation[0], first);
        assert!((first - ((now * 0.001).sin() * 0.1) as f32).abs() < 1e-6);
    }

    #[test]
    fn pitch_is_bounded() {
        let spin = Spin::default();

        for step in 0..1000 {
            assert!(spin.pitch_at(f64::from(step) * 37.0).abs() <= 0.1);
        }
    }

    #[test]
    fn rotation_z_is_untouched() {
        let spin = Spin::default();
        let mut transform = Transform::default();
        transform.rotation[2] = 0.25;

        spin.apply(&mut transform, 1000.0);

        assert_eq!(transform.rotation[2], 0.25);
    }
}
