//! Per-lane spring-damper integration.
//!
//! Each simulated joint owns four independent scalar springs (the lanes).
//! Parent motion enters as a per-tick stimulus; the integrator tracks the
//! stimulus rate of change and feeds it back as an opposing acceleration, so
//! sustained motion settles instead of winding up.

use crate::config::JointKind;
use glam::Vec3;
use tracing::debug;

/// Fraction of the parent displacement magnitude fed to the stretch and
/// twist lanes.
const STRETCH_INDICATOR_SHARE: f32 = 1.0 / 3.0;

/// Spring state for one joint's lanes.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LaneState {
    /// Displacement from rest.
    pub p: [f32; 4],
    /// Velocity.
    pub v: [f32; 4],
    /// Acceleration at the end of the last step.
    pub a: [f32; 4],
    /// Stimulus velocity from the last step.
    pub ext_v: [f32; 4],
    /// Stimulus acceleration from the last step.
    pub ext_a: [f32; 4],
}

impl LaneState {
    /// Zeros all lanes.
    pub fn reset(&mut self) {
        *self = LaneState::default();
    }

    /// Scales displacement and velocity, leaving stimulus history intact.
    pub fn squash(&mut self, scale: f32) {
        for i in 0..4 {
            self.p[i] *= scale;
            self.v[i] *= scale;
        }
    }
}

/// Maps a parent-local displacement onto stimulus lanes.
///
/// Rotational kinds read lateral from +x and forward from -z, with the
/// displacement magnitude shared onto the stretch and twist lanes. Point
/// joints take the displacement componentwise.
pub(crate) fn stimulus(kind: JointKind, delta: Vec3) -> [f32; 4] {
    match kind {
        JointKind::Point => [delta.x, delta.y, delta.z, 0.0],
        _ => {
            let reach = delta.length() * STRETCH_INDICATOR_SHARE;
            [delta.x, -delta.z, reach, reach]
        }
    }
}

/// Clamps a per-frame parent displacement to `max_step` length-units.
pub(crate) fn clamp_step(delta: Vec3, max_step: f32) -> Vec3 {
    let len = delta.length();
    if len > max_step {
        debug!(step = len, max = max_step, "clamping oversized parent step");
        delta * (max_step / len)
    } else {
        delta
    }
}

/// Advances masked lanes by one velocity-Verlet step.
///
/// `ds` is the step in seconds and must be positive. The stimulus enters the
/// position update directly and its second derivative opposes the
/// acceleration, which is what lets a constant-velocity parent carry the
/// joint without unbounded wind-up.
pub(crate) fn integrate(
    state: &mut LaneState,
    mask: [bool; 4],
    stiffness: [f32; 4],
    damping: [f32; 4],
    stimulus: [f32; 4],
    ds: f32,
) {
    for i in 0..4 {
        if !mask[i] {
            continue;
        }
        let ext_v = stimulus[i] / ds;
        let ext_a = (ext_v - state.ext_v[i]) / ds;
        state.ext_v[i] = ext_v;
        state.ext_a[i] = ext_a;

        let a1 = -stiffness[i] * state.p[i] - damping[i] * state.v[i] - ext_a;
        state.p[i] += state.v[i] * ds + 0.5 * a1 * ds * ds + stimulus[i];
        let v_half = state.v[i] + 0.5 * a1 * ds;
        let a2 = -stiffness[i] * state.p[i] - damping[i] * v_half - ext_a;
        state.v[i] += 0.5 * (a1 + a2) * ds;
        state.a[i] = a2;
    }
}
