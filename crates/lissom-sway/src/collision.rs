//! Sphere-exclusion zones.
//!
//! A zone is a sphere anchored to another joint that the simulated joint may
//! not enter. Intrusions are resolved geometrically, not by forces: the joint
//! swings on a sphere around its parent, so the reachable escape set is the
//! circle where the swing sphere and the zone sphere intersect. The joint is
//! projected onto that circle and the parent minimally rotated to match.

use crate::config::Seed;
use glam::{Quat, Vec3};
use lissom_rig::{JointId, JointSource};

/// A validated exclusion zone with its obstacle resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Zone {
    pub obstacle: JointId,
    pub radius: f32,
    pub radius_sq: f32,
    pub local_offset: Option<Vec3>,
}

/// World-space center of a zone.
pub(crate) fn zone_center<S: JointSource>(source: &S, zone: &Zone) -> Vec3 {
    let pos = source.world_position(zone.obstacle);
    match zone.local_offset {
        Some(offset) => pos + source.world_rotation(zone.obstacle) * offset,
        None => pos,
    }
}

/// Pushes a joint out of one zone by minimally rotating its parent.
///
/// Runs in the parent's local frame, after the frame's pose write. When the
/// intersection circle is ambiguous the candidate on the rest pose's side is
/// taken; a wrong-side candidate is reflected across the rest direction,
/// which is continuous through the boundary. Returns true when a correction
/// was written; the parent's world transform is refreshed so subsequent
/// zones observe it.
pub(crate) fn resolve_zone<S: JointSource>(source: &mut S, seed: &Seed, zone: &Zone) -> bool {
    let parent_pos = source.world_position(seed.parent);
    let parent_rot = source.world_rotation(seed.parent);
    let c = parent_rot.inverse() * (zone_center(source, zone) - parent_pos);
    let d = source.local_position(seed.joint);

    if (d - c).length_squared() >= zone.radius_sq {
        return false;
    }
    let r1 = d.length();
    let r2 = c.length();
    if r1 < 1e-6 {
        return false;
    }
    // One sphere contains the other: no intersection circle to escape along
    if r2 > zone.radius + r1 || r2 < (zone.radius - r1).abs() {
        return false;
    }

    let n = c / r2;
    let k = (r2 * r2 + r1 * r1 - zone.radius_sq) / (2.0 * r2);
    let rc = (r1 * r1 - k * k).max(0.0).sqrt();

    let planar = d - d.dot(n) * n;
    let rest_planar = seed.rest_local - seed.rest_local.dot(n) * n;
    let rest_dir = if rest_planar.length_squared() > 1e-12 {
        Some(rest_planar.normalize())
    } else {
        None
    };
    let u = if planar.length_squared() > 1e-12 {
        let u = planar.normalize();
        match rest_dir {
            Some(r_hat) if u.dot(r_hat) < 0.0 => (u - 2.0 * u.dot(r_hat) * r_hat).normalize(),
            _ => u,
        }
    } else {
        // Joint lies on the zone axis; any circle direction is equidistant
        rest_dir.unwrap_or_else(|| n.any_orthonormal_vector())
    };

    let corrected = n * k + u * rc;
    let swing = Quat::from_rotation_arc(d / r1, corrected.normalize());
    source.set_local_rotation(seed.parent, source.local_rotation(seed.parent) * swing);
    source.refresh_world(seed.parent);
    true
}
