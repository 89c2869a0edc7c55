use glam::{Quat, Vec3};

// Dot products closer to one than this are treated as parallel; the slerp
// denominator degenerates there.
const SLERP_PARALLEL_THRESHOLD: f32 = 0.9995;

#[inline]
pub fn lerp_unclamped(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Callers guarantee `a < b`; the result is undefined when `a == b`.
#[inline]
pub fn inverse_lerp_unclamped(a: f64, b: f64, value: f64) -> f64 {
    (value - a) / (b - a)
}

#[inline]
pub fn lerp_unclamped_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Spherical interpolation that extrapolates for `t` outside [0, 1].
///
/// Linear quaternion interpolation skews angles once `t` leaves the unit
/// range (0° to 60° at t = 1.5 lands near 86° instead of 90°), so overshoot
/// must go through the spherical form.
pub fn slerp_unclamped(from: Quat, to: Quat, t: f32) -> Quat {
    let mut to = to;
    let mut dot = from.dot(to);

    // Take the short way around.
    if dot < 0.0 {
        to = -to;
        dot = -dot;
    }

    if dot > SLERP_PARALLEL_THRESHOLD {
        return Quat::from_xyzw(
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t,
            from.z + (to.z - from.z) * t,
            from.w + (to.w - from.w) * t,
        )
        .normalize();
    }

    let theta = dot.clamp(-1.0, 1.0).acos();
    let sin_theta = theta.sin();
    let scale_from = ((1.0 - t) * theta).sin() / sin_theta;
    let scale_to = (t * theta).sin() / sin_theta;

    (from * scale_from + to * scale_to).normalize()
}
