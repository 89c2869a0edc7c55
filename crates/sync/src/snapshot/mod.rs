mod buffer;

pub use buffer::SnapshotBuffer;

use glam::{Quat, Vec3};

use crate::math::{lerp_unclamped, lerp_unclamped_vec3, slerp_unclamped};

/// Local-space pose, so parented rigs keep their hierarchy while synced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// A pose stamped with seconds in the sender's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub timestamp: f64,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Snapshot {
    pub fn new(timestamp: f64, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            timestamp,
            position,
            rotation,
            scale,
        }
    }
}

// Unclamped throughout: t past 1 extrapolates, which is how playback rides
// out a gap in arrivals.
pub fn interpolate(from: &Snapshot, to: &Snapshot, t: f64) -> Snapshot {
    let ts = t as f32;

    Snapshot {
        timestamp: lerp_unclamped(from.timestamp, to.timestamp, t),
        position: lerp_unclamped_vec3(from.position, to.position, ts),
        rotation: slerp_unclamped(from.rotation, to.rotation, ts),
        scale: lerp_unclamped_vec3(from.scale, to.scale, ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Snapshot, Snapshot) {
        let from = Snapshot::new(
            0.0,
            Vec3::new(1.0, 1.0, 1.0),
            Quat::IDENTITY,
            Vec3::new(3.0, 3.0, 3.0),
        );
        let to = Snapshot::new(
            1.0,
            Vec3::new(2.0, 2.0, 2.0),
            Quat::from_rotation_y(60f32.to_radians()),
            Vec3::new(4.0, 4.0, 4.0),
        );
        (from, to)
    }

    #[test]
    fn midpoint_matches_componentwise_lerp() {
        let (from, to) = pair();
        let mid = interpolate(&from, &to, 0.5);

        assert_eq!(mid.timestamp, 0.5);
        assert_eq!(mid.position, Vec3::new(1.5, 1.5, 1.5));
        assert_eq!(mid.scale, Vec3::new(3.5, 3.5, 3.5));

        let (_, angle) = mid.rotation.to_axis_angle();
        assert!((angle - 30f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn overshoot_extrapolates_spherically() {
        let (from, to) = pair();
        let over = interpolate(&from, &to, 1.5);

        assert_eq!(over.timestamp, 1.5);
        assert_eq!(over.position, Vec3::new(2.5, 2.5, 2.5));
        assert_eq!(over.scale, Vec3::new(4.5, 4.5, 4.5));

        // Slerp reaches 90 degrees here; lerp would skew to roughly 86.
        let (_, angle) = over.rotation.to_axis_angle();
        assert!((angle - 90f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn parameter_sweep_stays_linear_in_position() {
        let (from, to) = pair();

        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let snap = interpolate(&from, &to, t);
            let expected = lerp_unclamped_vec3(from.position, to.position, t as f32);
            assert!((snap.position - expected).length() < 1e-6);
            assert!((snap.timestamp - lerp_unclamped(from.timestamp, to.timestamp, t)).abs() < 1e-12);
        }
    }
}
