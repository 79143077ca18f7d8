//! Writing spring state into the joint hierarchy.
//!
//! A simulated joint owns its parent's local rotation: every frame the
//! rotation is rebuilt from the captured rest baseline (or the re-derived
//! pivot heading) plus the bend, twist, and stretch the springs produced.

use crate::config::{
    JointKind, Seed, SwayOptions, LANE_FORWARD, LANE_LATERAL, LANE_STRETCH, LANE_TWIST,
};
use glam::{Quat, Vec3};
use lissom_rig::JointSource;

/// Converts raw spring displacement into final applied lane values:
/// movement scale, then offset biases, then limit clamps, with lanes the
/// kind does not simulate zeroed.
pub(crate) fn applied_lanes(
    seed: &Seed,
    p: [f32; 4],
    opts: &SwayOptions,
    parent_world_rot: Quat,
) -> [f32; 4] {
    let config = &seed.config;
    let mut out = [0.0f32; 4];
    for i in 0..4 {
        out[i] = p[i] * opts.movement_scale;
    }
    if let Some(v) = config.local_offset {
        add_offset(&mut out, config.kind, v);
    }
    if let Some(v) = config.world_offset {
        add_offset(&mut out, config.kind, parent_world_rot.inverse() * v);
    }
    for i in 0..4 {
        if let Some(limit) = config.limits[i] {
            out[i] = limit.clamp(out[i]);
        }
    }
    let mask = config.kind.lane_mask();
    for i in 0..4 {
        if !mask[i] {
            out[i] = 0.0;
        }
    }
    out
}

/// Embeds an offset vector (already in the parent's local space) into lanes.
fn add_offset(lanes: &mut [f32; 4], kind: JointKind, v: Vec3) {
    match kind {
        JointKind::Point => {
            lanes[0] += v.x;
            lanes[1] += v.y;
            lanes[2] += v.z;
        }
        _ => {
            lanes[LANE_LATERAL] += v.x;
            lanes[LANE_FORWARD] += -v.z;
            lanes[LANE_STRETCH] += v.y;
        }
    }
}

/// Writes applied lane values into the hierarchy and refreshes the chain
/// down to the joint.
pub(crate) fn apply<S: JointSource>(
    source: &mut S,
    seed: &Seed,
    opts: &SwayOptions,
    applied: [f32; 4],
) {
    match seed.config.kind {
        JointKind::Point => {
            let offset = Vec3::new(applied[0], applied[1], applied[2]);
            source.set_local_position(seed.joint, seed.rest_local + offset);
        }
        kind => {
            let baseline = if seed.config.pivot {
                pivot_baseline(source, seed)
            } else {
                seed.rest_parent_rotation
            };
            let bend_lateral = -(applied[LANE_LATERAL] / seed.length).atan();
            let bend_forward = -(applied[LANE_FORWARD] / seed.length).atan();
            let mut rotation = baseline
                * Quat::from_rotation_z(bend_lateral)
                * Quat::from_rotation_x(bend_forward);
            if kind.has_twist() {
                let angle = 1.5 * (1.5 * applied[LANE_TWIST]).tanh();
                rotation *= Quat::from_axis_angle(seed.rest_local / seed.length, angle);
            }
            source.set_local_rotation(seed.parent, rotation);

            if kind.has_stretch() {
                let soft = seed.length * opts.stretch_share;
                if soft > f32::EPSILON {
                    let stretched = seed.length + soft * (applied[LANE_STRETCH] / soft).tanh();
                    source
                        .set_local_position(seed.joint, seed.rest_local * (stretched / seed.length));
                }
            }
        }
    }
    source.refresh_ancestors(seed.joint);
}

/// Restores the captured rest pose for one joint.
pub(crate) fn restore_rest<S: JointSource>(source: &mut S, seed: &Seed) {
    source.set_local_position(seed.joint, seed.rest_local);
    if seed.config.kind.is_rotational() {
        source.set_local_rotation(seed.parent, seed.rest_parent_rotation);
    }
    source.refresh_ancestors(seed.joint);
}

/// Rebuilds the rest orientation from the parent's current heading, keeping
/// only the yaw so the joint hangs level while the body pitches and rolls.
fn pivot_baseline<S: JointSource>(source: &S, seed: &Seed) -> Quat {
    let forward = source.world_rotation(seed.parent) * Vec3::Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    let yaw = if flat.length_squared() > 1e-8 {
        Quat::from_rotation_arc(Vec3::Z, flat.normalize())
    } else {
        // Heading is undefined looking straight up or down; hold level
        Quat::IDENTITY
    };
    let grandparent = match source.parent(seed.parent) {
        Some(gp) => source.world_rotation(gp),
        None => Quat::IDENTITY,
    };
    grandparent.inverse() * yaw
}
