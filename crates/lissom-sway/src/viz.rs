//! Debug-draw primitives for inspecting simulated joints.
//!
//! The engine emits plain geometric shapes; hosts decide how to render
//! them (gizmo lines, immediate-mode overlays, log dumps).

use crate::collision;
use crate::config::Seed;
use glam::Vec3;
use lissom_rig::JointSource;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single shape describing simulation state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DebugPrimitive {
    /// A point marker at a simulated joint.
    Marker {
        /// World-space position of the joint.
        position: Vec3,
    },
    /// A line from a joint's parent to the joint.
    Segment {
        /// World-space position of the parent.
        start: Vec3,
        /// World-space position of the joint.
        end: Vec3,
    },
    /// An exclusion zone boundary.
    WireSphere {
        /// World-space center of the zone.
        center: Vec3,
        /// Zone radius.
        radius: f32,
    },
}

/// Collects primitives for every seed whose config opted into debug
/// output. Joint worlds are read as-is; callers refresh first.
pub(crate) fn collect<'a, S, I>(source: &S, seeds: I) -> Vec<DebugPrimitive>
where
    S: JointSource,
    I: IntoIterator<Item = &'a Seed>,
{
    let mut out = Vec::new();
    for seed in seeds {
        if !seed.config.debug_visible {
            continue;
        }
        let end = source.world_position(seed.joint);
        out.push(DebugPrimitive::Marker { position: end });
        out.push(DebugPrimitive::Segment {
            start: source.world_position(seed.parent),
            end,
        });
        for zone in &seed.zones {
            out.push(DebugPrimitive::WireSphere {
                center: collision::zone_center(source, zone),
                radius: zone.radius,
            });
        }
    }
    out
}
