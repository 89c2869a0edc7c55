use crate::math::inverse_lerp_unclamped;
use crate::snapshot::{Snapshot, SnapshotBuffer, interpolate};

/// Playback accumulators for one direction of one entity: the sender's
/// clock simulated locally (seeded from the first buffered snapshot, never
/// rewound) and the elapsed seconds inside the current oldest pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolationState {
    remote_time: f64,
    interpolation_time: f64,
    initialized: bool,
}

impl InterpolationState {
    pub fn new() -> Self {
        Self::default()
    }

    // Reports 0 until the first snapshot seeds the clock.
    pub fn remote_time(&self) -> f64 {
        if self.initialized { self.remote_time } else { 0.0 }
    }

    pub fn interpolation_time(&self) -> f64 {
        self.interpolation_time
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Advances playback by `delta_time` and returns the pose for this tick, or
/// `None` while the buffer is warming up or still inside the buffering
/// window. `buffer_time` is the deliberate playback delay: lagging the live
/// remote clock gives jitter room to settle and keeps a second snapshot to
/// interpolate toward.
///
/// Retires at most one snapshot per call; a delta spanning several pair
/// intervals extrapolates instead of skipping ahead.
pub fn compute(
    buffer_time: f64,
    delta_time: f64,
    state: &mut InterpolationState,
    buffer: &mut SnapshotBuffer,
) -> Option<Snapshot> {
    // Time never rewinds; a non-positive delta still bootstraps below.
    let delta_time = delta_time.max(0.0);

    if !state.initialized {
        let first = buffer.first()?;
        state.remote_time = first.timestamp;
        state.initialized = true;
    }

    state.remote_time += delta_time;

    if buffer.len() < 2 {
        return None;
    }

    // The second snapshot has to be older than the buffering window before
    // playback between the pair starts.
    if buffer.second()?.timestamp > state.remote_time - buffer_time {
        return None;
    }

    state.interpolation_time += delta_time;

    let mut first = *buffer.first()?;
    let mut second = *buffer.second()?;
    let delta = second.timestamp - first.timestamp;

    if state.interpolation_time >= delta && buffer.len() >= 3 {
        // Subtracting the span instead of zeroing keeps the fractional
        // overshoot, so playback speed stays steady across the seam.
        state.interpolation_time -= delta;
        buffer.pop_oldest();
        first = *buffer.first()?;
        second = *buffer.second()?;
    }

    let t = inverse_lerp_unclamped(
        first.timestamp,
        second.timestamp,
        first.timestamp + state.interpolation_time,
    );

    Some(interpolate(&first, &second, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn snap(ts: f64, p: f32, rot_deg: f32, s: f32) -> Snapshot {
        Snapshot::new(
            ts,
            Vec3::splat(p),
            Quat::from_rotation_y(rot_deg.to_radians()),
            Vec3::splat(s),
        )
    }

    fn angle_y(q: Quat) -> f32 {
        let (_, angle) = q.to_axis_angle();
        angle.to_degrees()
    }

    #[test]
    fn empty_buffer_does_nothing() {
        let mut state = InterpolationState::new();
        let mut buffer = SnapshotBuffer::new();

        let result = compute(0.0, 0.0, &mut state, &mut buffer);

        assert!(result.is_none());
        assert_eq!(state.remote_time(), 0.0);
        assert_eq!(state.interpolation_time(), 0.0);
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn first_snapshot_seeds_remote_time() {
        let mut state = InterpolationState::new();
        let mut buffer = SnapshotBuffer::new();
        buffer.insert_if_new_enough(snap(1.0, 0.0, 0.0, 1.0));

        let result = compute(0.0, 0.5, &mut state, &mut buffer);

        assert!(result.is_none());
        assert_eq!(state.remote_time(), 1.5);
        assert_eq!(state.interpolation_time(), 0.0);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn waits_until_buffer_window_elapses() {
        let mut state = InterpolationState::new();
        let mut buffer = SnapshotBuffer::new();
        buffer.insert_if_new_enough(snap(0.1, 0.0, 0.0, 1.0));
        buffer.insert_if_new_enough(snap(1.1, 1.0, 0.0, 1.0));

        // Seed, then advance to the tick under test.
        compute(2.0, 0.0, &mut state, &mut buffer);
        state_advance(&mut state, 2.5);

        let result = compute(2.0, 0.5, &mut state, &mut buffer);

        // second.ts = 1.1 is still newer than remote_time - buffer_time = 1.0.
        assert!(result.is_none());
        assert_eq!(state.remote_time(), 3.0);
        assert_eq!(state.interpolation_time(), 0.0);
    }

    // Drives remote_time forward without touching the buffer gates.
    fn state_advance(state: &mut InterpolationState, to: f64) {
        state.remote_time = to;
    }

    fn warm_pair() -> (InterpolationState, SnapshotBuffer) {
        let mut buffer = SnapshotBuffer::new();
        buffer.insert_if_new_enough(snap(0.0, 1.0, 0.0, 3.0));
        buffer.insert_if_new_enough(snap(1.0, 2.0, 60.0, 4.0));

        let mut state = InterpolationState::new();
        compute(2.0, 0.0, &mut state, &mut buffer);
        state_advance(&mut state, 2.5);

        (state, buffer)
    }

    #[test]
    fn interpolates_at_midpoint() {
        let (mut state, mut buffer) = warm_pair();

        let result = compute(2.0, 0.5, &mut state, &mut buffer).unwrap();

        assert_eq!(state.remote_time(), 3.0);
        assert_eq!(state.interpolation_time(), 0.5);
        assert_eq!(buffer.len(), 2);
        assert_eq!(result.position, Vec3::splat(1.5));
        assert_eq!(result.scale, Vec3::splat(3.5));
        assert!((angle_y(result.rotation) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn extrapolates_without_a_third_snapshot() {
        let (mut state, mut buffer) = warm_pair();
        state.interpolation_time = 1.0;

        let result = compute(2.0, 0.5, &mut state, &mut buffer).unwrap();

        assert_eq!(state.remote_time(), 3.0);
        assert_eq!(state.interpolation_time(), 1.5);
        assert_eq!(buffer.len(), 2);
        assert_eq!(result.position, Vec3::splat(2.5));
        assert_eq!(result.scale, Vec3::splat(4.5));
        // Spherical extrapolation lands on 90 degrees, not lerp's ~86.
        assert!((angle_y(result.rotation) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn retires_oldest_on_overshoot_with_third_available() {
        let (mut state, mut buffer) = warm_pair();
        buffer.insert_if_new_enough(snap(2.0, 4.0, 120.0, 6.0));
        state.interpolation_time = 1.0;

        let result = compute(2.0, 0.5, &mut state, &mut buffer).unwrap();

        assert_eq!(state.remote_time(), 3.0);
        // Overshoot fraction survives the seam: 1.0 + 0.5 - 1.0.
        assert_eq!(state.interpolation_time(), 0.5);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.first().unwrap().timestamp, 1.0);
        assert_eq!(result.position, Vec3::splat(3.0));
        assert_eq!(result.scale, Vec3::splat(5.0));
        assert!((angle_y(result.rotation) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn retires_at_most_one_snapshot_per_call() {
        let mut buffer = SnapshotBuffer::new();
        for i in 0..5 {
            buffer.insert_if_new_enough(snap(i as f64, i as f32, 0.0, 1.0));
        }

        let mut state = InterpolationState::new();
        compute(0.0, 0.0, &mut state, &mut buffer);

        // One huge delta spans several pair intervals.
        compute(0.0, 3.5, &mut state, &mut buffer);

        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn negative_delta_does_not_rewind() {
        let (mut state, mut buffer) = warm_pair();

        let result = compute(2.0, -1.0, &mut state, &mut buffer);

        assert!(result.is_none());
        assert_eq!(state.remote_time(), 2.5);
        assert_eq!(state.interpolation_time(), 0.0);
    }

    #[test]
    fn reset_returns_to_fresh_start() {
        let (mut state, mut buffer) = warm_pair();
        compute(2.0, 0.5, &mut state, &mut buffer);

        state.reset();
        buffer.clear();

        assert!(!state.is_initialized());
        assert_eq!(state.remote_time(), 0.0);
        assert_eq!(state.interpolation_time(), 0.0);

        // Behaves exactly like a fresh engine afterwards.
        buffer.insert_if_new_enough(snap(10.0, 0.0, 0.0, 1.0));
        let result = compute(0.0, 0.5, &mut state, &mut buffer);
        assert!(result.is_none());
        assert_eq!(state.remote_time(), 10.5);
    }

    #[test]
    fn playback_is_continuous_across_retirement() {
        let mut buffer = SnapshotBuffer::new();
        for i in 0..4 {
            buffer.insert_if_new_enough(snap(i as f64 * 0.1, i as f32, 0.0, 1.0));
        }

        let mut state = InterpolationState::new();
        compute(0.1, 0.0, &mut state, &mut buffer);

        let mut last_ts = f64::NEG_INFINITY;
        let mut last_x = f32::NEG_INFINITY;
        for _ in 0..12 {
            if let Some(snap) = compute(0.1, 0.033, &mut state, &mut buffer) {
                assert!(snap.timestamp >= last_ts);
                assert!(snap.position.x >= last_x);
                last_ts = snap.timestamp;
                last_x = snap.position.x;
            }
        }
        assert!(last_ts > f64::NEG_INFINITY);
    }
}
