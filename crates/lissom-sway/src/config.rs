//! Joint configuration, engine options, and setup validation.
//!
//! Each simulated joint carries up to four spring lanes, indexed by the
//! `LANE_*` constants: lateral bend, forward bend, stretch, and twist. Point
//! joints reuse lanes 0..=2 as independent x/y/z translation.

use crate::collision::Zone;
use crate::error::ConfigError;
use glam::{Quat, Vec3};
use lissom_rig::{JointId, JointSource};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lane index for lateral bend (x for point joints).
pub const LANE_LATERAL: usize = 0;
/// Lane index for forward bend (y for point joints).
pub const LANE_FORWARD: usize = 1;
/// Lane index for stretch (z for point joints).
pub const LANE_STRETCH: usize = 2;
/// Lane index for twist.
pub const LANE_TWIST: usize = 3;

/// Rotational joints need a rest offset to bend around.
pub(crate) const MIN_JOINT_LENGTH: f32 = 1e-5;

/// Which degrees of freedom a simulated joint exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum JointKind {
    /// Three independent translation lanes; never rotates its parent.
    Point,
    /// Lateral and forward bend only.
    Link,
    /// Bend lanes plus stretch along the joint axis.
    MixStretch,
    /// Bend lanes plus twist around the joint axis.
    MixTwist,
    /// All four lanes.
    Full,
}

impl JointKind {
    /// Returns which lanes this kind simulates.
    pub fn lane_mask(self) -> [bool; 4] {
        match self {
            JointKind::Point => [true, true, true, false],
            JointKind::Link => [true, true, false, false],
            JointKind::MixStretch => [true, true, true, false],
            JointKind::MixTwist => [true, true, false, true],
            JointKind::Full => [true, true, true, true],
        }
    }

    /// Returns true for kinds that drive the parent's rotation.
    pub fn is_rotational(self) -> bool {
        self != JointKind::Point
    }

    /// Returns true if the stretch lane is active.
    pub fn has_stretch(self) -> bool {
        matches!(self, JointKind::MixStretch | JointKind::Full)
    }

    /// Returns true if the twist lane is active.
    pub fn has_twist(self) -> bool {
        matches!(self, JointKind::MixTwist | JointKind::Full)
    }

    /// Returns the host-facing name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            JointKind::Point => "point",
            JointKind::Link => "link",
            JointKind::MixStretch => "mixStretch",
            JointKind::MixTwist => "mixTwist",
            JointKind::Full => "full",
        }
    }
}

impl FromStr for JointKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(JointKind::Point),
            "link" => Ok(JointKind::Link),
            "mixStretch" => Ok(JointKind::MixStretch),
            "mixTwist" => Ok(JointKind::MixTwist),
            "full" => Ok(JointKind::Full),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

/// A spring coefficient: one value for every lane, or one per lane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Gain {
    /// The same coefficient on every lane.
    Uniform(f32),
    /// Per-lane coefficients in `LANE_*` order.
    Lanes([f32; 4]),
}

impl Gain {
    /// Expands to per-lane values.
    pub fn lanes(self) -> [f32; 4] {
        match self {
            Gain::Uniform(v) => [v; 4],
            Gain::Lanes(v) => v,
        }
    }
}

impl From<f32> for Gain {
    fn from(v: f32) -> Self {
        Gain::Uniform(v)
    }
}

impl From<[f32; 4]> for Gain {
    fn from(v: [f32; 4]) -> Self {
        Gain::Lanes(v)
    }
}

/// An ordered clamp on one lane's applied value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Limit {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Limit {
    /// Creates a new limit.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamps a value into the range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// A spherical no-go zone anchored to another joint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneConfig {
    /// Name of the joint the zone is anchored to.
    pub obstacle: String,
    /// Sphere radius in length-units.
    pub radius: f32,
    /// Offset of the sphere center in the obstacle's local space.
    pub local_offset: Option<Vec3>,
}

impl ZoneConfig {
    /// Creates a zone around a joint.
    pub fn new(obstacle: impl Into<String>, radius: f32) -> Self {
        Self {
            obstacle: obstacle.into(),
            radius,
            local_offset: None,
        }
    }

    /// Offsets the zone center in the obstacle's local space.
    pub fn with_local_offset(mut self, offset: Vec3) -> Self {
        self.local_offset = Some(offset);
        self
    }
}

/// Configuration for one simulated joint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointConfig {
    /// Name of the skeletal joint to simulate. Must exist and have a parent.
    pub joint: String,
    /// Which degrees of freedom to simulate.
    pub kind: JointKind,
    /// Per-lane spring stiffness (restoring pull toward rest).
    pub stiffness: Gain,
    /// Per-lane damping (resistance to lane velocity).
    pub damping: Gain,
    /// Reaction strength to parent motion, within `[0, 1]`.
    pub external_factor: f32,
    /// Optional per-lane clamps on the applied values.
    pub limits: [Option<Limit>; 4],
    /// Constant bias in the parent's local space.
    pub local_offset: Option<Vec3>,
    /// Constant bias in world space.
    pub world_offset: Option<Vec3>,
    /// Re-derive the rest orientation each frame from the parent's current
    /// heading, keeping only its yaw. For free-hanging joints on animated
    /// bodies. Rejected for point joints.
    pub pivot: bool,
    /// Spherical zones the joint is pushed out of.
    pub exclude_zones: Vec<ZoneConfig>,
    /// Emit debug primitives for this joint.
    pub debug_visible: bool,
}

impl JointConfig {
    /// Creates a config with default spring parameters.
    pub fn new(joint: impl Into<String>, kind: JointKind) -> Self {
        Self {
            joint: joint.into(),
            kind,
            stiffness: Gain::Uniform(10.0),
            damping: Gain::Uniform(2.0),
            external_factor: 1.0,
            limits: [None; 4],
            local_offset: None,
            world_offset: None,
            pivot: false,
            exclude_zones: Vec::new(),
            debug_visible: false,
        }
    }

    /// Loose, floppy motion for hair strands.
    pub fn hair(joint: impl Into<String>) -> Self {
        Self::new(joint, JointKind::Link)
            .with_stiffness(8.0)
            .with_damping(1.5)
    }

    /// Heavier swing with twist and stretch, for ponytails and braids.
    pub fn ponytail(joint: impl Into<String>) -> Self {
        Self::new(joint, JointKind::Full)
            .with_stiffness([6.0, 6.0, 4.0, 3.0])
            .with_damping([1.5, 1.5, 2.0, 1.0])
    }

    /// Tight, bounded jiggle with stretch, for chest joints.
    pub fn breast(joint: impl Into<String>) -> Self {
        Self::new(joint, JointKind::MixStretch)
            .with_stiffness([14.0, 14.0, 20.0, 0.0])
            .with_damping([3.0, 3.0, 4.0, 0.0])
            .with_limit(LANE_LATERAL, -0.08, 0.08)
            .with_limit(LANE_FORWARD, -0.08, 0.08)
            .with_limit(LANE_STRETCH, -0.05, 0.05)
    }

    /// Snappy, well-damped swing for earrings and pendants.
    pub fn accessory(joint: impl Into<String>) -> Self {
        Self::new(joint, JointKind::Link)
            .with_stiffness(18.0)
            .with_damping(3.5)
            .with_pivot(true)
    }

    /// Sets stiffness from a scalar or per-lane array.
    pub fn with_stiffness(mut self, stiffness: impl Into<Gain>) -> Self {
        self.stiffness = stiffness.into();
        self
    }

    /// Sets damping from a scalar or per-lane array.
    pub fn with_damping(mut self, damping: impl Into<Gain>) -> Self {
        self.damping = damping.into();
        self
    }

    /// Sets the reaction strength to parent motion.
    pub fn with_external_factor(mut self, factor: f32) -> Self {
        self.external_factor = factor;
        self
    }

    /// Clamps one lane's applied value. Lanes are the `LANE_*` constants.
    pub fn with_limit(mut self, lane: usize, min: f32, max: f32) -> Self {
        self.limits[lane] = Some(Limit::new(min, max));
        self
    }

    /// Sets a constant bias in the parent's local space.
    pub fn with_local_offset(mut self, offset: Vec3) -> Self {
        self.local_offset = Some(offset);
        self
    }

    /// Sets a constant bias in world space.
    pub fn with_world_offset(mut self, offset: Vec3) -> Self {
        self.world_offset = Some(offset);
        self
    }

    /// Enables or disables pivot mode.
    pub fn with_pivot(mut self, pivot: bool) -> Self {
        self.pivot = pivot;
        self
    }

    /// Adds an exclusion zone.
    pub fn with_zone(mut self, zone: ZoneConfig) -> Self {
        self.exclude_zones.push(zone);
        self
    }

    /// Enables debug primitive emission.
    pub fn with_debug_visible(mut self, visible: bool) -> Self {
        self.debug_visible = visible;
        self
    }
}

/// Engine-wide tuning knobs.
///
/// The defaults reproduce the stock behavior; every empirical constant in the
/// simulation is exposed here by name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwayOptions {
    /// Global multiplier on parent-motion stimulus.
    pub sensitivity: f32,
    /// Global multiplier on applied spring state.
    pub movement_scale: f32,
    /// Duration of the start-up damping window, in milliseconds.
    pub warmup_ms: f32,
    /// Factor the spring state is squashed by each tick during warm-up.
    pub warmup_scale: f32,
    /// Largest per-frame parent displacement fed to the springs, in
    /// length-units. Larger steps are clamped.
    pub max_parent_step: f32,
    /// Frame delta above this restarts warm-up instead of integrating, in
    /// milliseconds.
    pub reset_threshold_ms: f32,
    /// Fraction of each child's lane velocity subtracted from the parent's
    /// stimulus, so chains don't double-count shared motion.
    pub child_velocity_share: f32,
    /// Fraction of the rest length the stretch lane saturates toward.
    pub stretch_share: f32,
}

impl Default for SwayOptions {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            movement_scale: 1.0,
            warmup_ms: 1000.0,
            warmup_scale: 1e-4,
            max_parent_step: 0.5,
            reset_threshold_ms: 1000.0,
            child_velocity_share: 1.0 / 3.0,
            stretch_share: 1.0 / 3.0,
        }
    }
}

impl SwayOptions {
    /// Sets the global stimulus multiplier.
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Sets the global applied-motion multiplier.
    pub fn with_movement_scale(mut self, scale: f32) -> Self {
        self.movement_scale = scale;
        self
    }

    /// Sets the start-up damping window.
    pub fn with_warmup_ms(mut self, ms: f32) -> Self {
        self.warmup_ms = ms;
        self
    }

    /// Sets the per-frame parent displacement clamp.
    pub fn with_max_parent_step(mut self, step: f32) -> Self {
        self.max_parent_step = step;
        self
    }

    /// Sets the frame-delta threshold that restarts warm-up.
    pub fn with_reset_threshold_ms(mut self, ms: f32) -> Self {
        self.reset_threshold_ms = ms;
        self
    }
}

/// A validated config with its captured rest state, ready to simulate.
#[derive(Debug, Clone)]
pub(crate) struct Seed {
    pub config: JointConfig,
    pub joint: JointId,
    pub parent: JointId,
    /// Joint's local position at setup.
    pub rest_local: Vec3,
    /// Parent's local rotation at setup.
    pub rest_parent_rotation: Quat,
    /// Rest offset magnitude; zero only for point joints.
    pub length: f32,
    pub zones: Vec<Zone>,
}

/// Validates configs against an armature and captures rest state.
///
/// Checks run per config in declaration order; the first violation aborts the
/// whole pass, so callers never observe partial state.
pub(crate) fn validate<S: JointSource>(
    source: &S,
    configs: &[JointConfig],
) -> Result<Vec<Seed>, ConfigError> {
    let mut seeds: Vec<Seed> = Vec::with_capacity(configs.len());

    for (index, config) in configs.iter().enumerate() {
        let joint = source
            .joint(&config.joint)
            .ok_or_else(|| ConfigError::UnknownJoint {
                index,
                name: config.joint.clone(),
            })?;
        let parent = source.parent(joint).ok_or_else(|| ConfigError::RootJoint {
            index,
            name: config.joint.clone(),
        })?;
        if seeds.iter().any(|s| s.joint == joint) {
            return Err(ConfigError::DuplicateJoint {
                index,
                name: config.joint.clone(),
            });
        }

        check_gain(index, "stiffness", config.stiffness)?;
        check_gain(index, "damping", config.damping)?;
        check_external_factor(index, config.external_factor)?;
        check_limits(index, &config.limits)?;
        check_offset(index, "local offset", config.local_offset)?;
        check_offset(index, "world offset", config.world_offset)?;

        if config.pivot && !config.kind.is_rotational() {
            return Err(ConfigError::PointPivot { index });
        }

        let rest_local = source.local_position(joint);
        let length = rest_local.length();
        if config.kind.is_rotational() && length < MIN_JOINT_LENGTH {
            return Err(ConfigError::ZeroLengthJoint {
                index,
                name: config.joint.clone(),
            });
        }

        let zones = check_zones(source, index, &config.exclude_zones)?;

        seeds.push(Seed {
            config: config.clone(),
            joint,
            parent,
            rest_local,
            rest_parent_rotation: source.local_rotation(parent),
            length,
            zones,
        });
    }

    Ok(seeds)
}

pub(crate) fn check_gain(
    index: usize,
    field: &'static str,
    gain: Gain,
) -> Result<(), ConfigError> {
    for value in gain.lanes() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidGain {
                index,
                field,
                value,
            });
        }
    }
    Ok(())
}

pub(crate) fn check_external_factor(index: usize, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ExternalFactorRange { index, value });
    }
    Ok(())
}

pub(crate) fn check_limits(index: usize, limits: &[Option<Limit>; 4]) -> Result<(), ConfigError> {
    for (lane, limit) in limits.iter().enumerate() {
        if let Some(l) = limit {
            if !l.min.is_finite() || !l.max.is_finite() || l.min > l.max {
                return Err(ConfigError::InvalidLimit { index, lane });
            }
        }
    }
    Ok(())
}

pub(crate) fn check_offset(
    index: usize,
    field: &'static str,
    offset: Option<Vec3>,
) -> Result<(), ConfigError> {
    match offset {
        Some(v) if !v.is_finite() => Err(ConfigError::NonFiniteOffset { index, field }),
        _ => Ok(()),
    }
}

/// Resolves zone configs against the armature, precomputing radii.
pub(crate) fn check_zones<S: JointSource>(
    source: &S,
    index: usize,
    zones: &[ZoneConfig],
) -> Result<Vec<Zone>, ConfigError> {
    let mut out = Vec::with_capacity(zones.len());
    for zone in zones {
        let obstacle = source
            .joint(&zone.obstacle)
            .ok_or_else(|| ConfigError::UnknownObstacle {
                index,
                name: zone.obstacle.clone(),
            })?;
        if !zone.radius.is_finite() || zone.radius < 0.0 {
            return Err(ConfigError::InvalidZoneRadius {
                index,
                value: zone.radius,
            });
        }
        check_offset(index, "exclusion zone offset", zone.local_offset)?;
        out.push(Zone {
            obstacle,
            radius: zone.radius,
            radius_sq: zone.radius * zone.radius,
            local_offset: zone.local_offset,
        });
    }
    Ok(out)
}
