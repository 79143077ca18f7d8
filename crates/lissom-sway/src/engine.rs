//! The simulation engine.
//!
//! [`SwaySystem`] owns per-joint spring state and drives the
//! stimulus/integrate/pose/collision pipeline over a joint hierarchy each
//! frame. It never allocates during [`SwaySystem::update`]; everything it
//! needs is planned at [`SwaySystem::setup`].

use crate::collision;
use crate::config::{self, JointConfig, JointKind, Seed, SwayOptions, MIN_JOINT_LENGTH};
use crate::error::ConfigError;
use crate::pose;
use crate::property::{Property, PropertyKey};
use crate::solver::{self, LaneState};
use crate::topology;
use crate::viz::{self, DebugPrimitive};
use glam::Vec3;
use lissom_rig::{JointId, JointSource};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Live state for one configured joint.
#[derive(Debug, Clone)]
struct Runtime {
    seed: Seed,
    state: LaneState,
    /// World position of the parent at the end of the last step.
    prev_parent: Vec3,
    /// Final lane values written to the pose last step.
    applied: [f32; 4],
    /// Runtime indices whose nearest simulated ancestor is this joint.
    children: Vec<usize>,
    root: bool,
}

/// A read-only snapshot of one simulated joint, for inspection and HUDs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointState {
    /// The joint's configured kind.
    pub kind: JointKind,
    /// Raw spring displacement per lane.
    pub position: [f32; 4],
    /// Spring velocity per lane.
    pub velocity: [f32; 4],
    /// Spring acceleration per lane at the end of the last step.
    pub acceleration: [f32; 4],
    /// Lane values actually written to the pose, after scale, offsets, and
    /// limits.
    pub applied: [f32; 4],
    /// True when no ancestor of this joint is itself simulated.
    pub root: bool,
    /// True while the start-up damping window is active.
    pub warming_up: bool,
}

/// Secondary-motion simulation over a joint hierarchy.
///
/// The system is configured once with [`setup`](SwaySystem::setup) and then
/// stepped with [`update`](SwaySystem::update) using the host's frame delta.
/// Joint locals at setup time are captured as the rest pose; hosts should
/// configure from a neutral pose.
#[derive(Debug, Clone, Default)]
pub struct SwaySystem {
    options: SwayOptions,
    /// Runtimes in declaration order.
    runtimes: Vec<Runtime>,
    /// Runtime indices in simulation order, shallowest first.
    order: Vec<usize>,
    /// World transforms refreshed at the top of every frame: the ancestor
    /// closure of all simulated joints and zone obstacles.
    refresh: Vec<JointId>,
    running: bool,
    configured: bool,
    elapsed_ms: f32,
}

impl SwaySystem {
    /// Creates an unconfigured system with the given tuning.
    pub fn new(options: SwayOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns the tuning the system was created with.
    pub fn options(&self) -> &SwayOptions {
        &self.options
    }

    /// Returns true while simulation steps advance state.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Validates `configs` against `source` and replaces the active
    /// configuration.
    ///
    /// On error nothing is replaced: a previously configured system keeps
    /// its joints and keeps running. Reconfiguring restores the previous
    /// joints to their rest pose first, so rest capture for the new set is
    /// not polluted by live spring state.
    pub fn setup<S: JointSource>(
        &mut self,
        source: &mut S,
        configs: &[JointConfig],
    ) -> Result<(), ConfigError> {
        if self.configured {
            for runtime in &self.runtimes {
                pose::restore_rest(source, &runtime.seed);
            }
        }
        let seeds = config::validate(source, configs)?;

        let mut plan = topology::plan(source, &seeds);
        self.runtimes = seeds
            .into_iter()
            .enumerate()
            .map(|(i, seed)| Runtime {
                seed,
                state: LaneState::default(),
                prev_parent: Vec3::ZERO,
                applied: [0.0; 4],
                children: std::mem::take(&mut plan.children[i]),
                root: plan.roots[i],
            })
            .collect();
        self.order = plan.order;
        self.rebuild_refresh(source);
        self.refresh_tracked(source);
        self.resync_parents(source);
        self.elapsed_ms = 0.0;
        self.running = true;
        self.configured = true;
        debug!(joints = self.runtimes.len(), "configured secondary motion");
        Ok(())
    }

    /// Advances the simulation by `dt_ms` milliseconds.
    ///
    /// Non-positive and non-finite deltas are ignored. A delta above
    /// [`SwayOptions::reset_threshold_ms`] skips the frame and restarts the
    /// warm-up window instead of integrating through the gap.
    pub fn update<S: JointSource>(&mut self, source: &mut S, dt_ms: f32) -> Result<(), ConfigError> {
        if !self.configured {
            return Err(ConfigError::NotConfigured);
        }
        if !self.running || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return Ok(());
        }
        if dt_ms > self.options.reset_threshold_ms {
            warn!(
                dt_ms,
                threshold_ms = self.options.reset_threshold_ms,
                "frame delta too large, restarting warm-up"
            );
            self.elapsed_ms = 0.0;
            self.refresh_tracked(source);
            self.resync_parents(source);
            return Ok(());
        }

        self.elapsed_ms += dt_ms;
        let ds = dt_ms / 1000.0;
        let warming = self.elapsed_ms < self.options.warmup_ms;

        self.refresh_tracked(source);
        for step in 0..self.order.len() {
            let index = self.order[step];
            self.step_joint(source, index, ds, warming);
        }
        Ok(())
    }

    /// Resets spring state, restores the rest pose, and resumes stepping.
    pub fn start<S: JointSource>(&mut self, source: &mut S) -> Result<(), ConfigError> {
        if !self.configured {
            return Err(ConfigError::NotConfigured);
        }
        for runtime in &mut self.runtimes {
            runtime.state.reset();
            runtime.applied = [0.0; 4];
        }
        for runtime in &self.runtimes {
            pose::restore_rest(source, &runtime.seed);
        }
        self.resync_parents(source);
        self.elapsed_ms = 0.0;
        self.running = true;
        Ok(())
    }

    /// Halts stepping and restores the rest pose. Spring state is kept;
    /// [`start`](SwaySystem::start) resets it.
    pub fn stop<S: JointSource>(&mut self, source: &mut S) {
        if !self.running {
            return;
        }
        for runtime in &self.runtimes {
            pose::restore_rest(source, &runtime.seed);
        }
        self.running = false;
    }

    /// Restores the rest pose and discards the whole configuration.
    pub fn dispose<S: JointSource>(&mut self, source: &mut S) {
        for runtime in &self.runtimes {
            pose::restore_rest(source, &runtime.seed);
        }
        self.runtimes.clear();
        self.order.clear();
        self.refresh.clear();
        self.elapsed_ms = 0.0;
        self.running = false;
        self.configured = false;
    }

    /// Returns the active configs in declaration order.
    pub fn config(&self) -> Vec<JointConfig> {
        self.runtimes.iter().map(|r| r.seed.config.clone()).collect()
    }

    /// Returns configured joint names in simulation order, shallowest first.
    pub fn joint_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&i| self.runtimes[i].seed.config.joint.as_str())
            .collect()
    }

    /// Returns a snapshot of one joint's spring state, or `None` if the
    /// joint is not configured.
    pub fn joint_state(&self, joint: &str) -> Option<JointState> {
        let runtime = &self.runtimes[self.position(joint)?];
        Some(JointState {
            kind: runtime.seed.config.kind,
            position: runtime.state.p,
            velocity: runtime.state.v,
            acceleration: runtime.state.a,
            applied: runtime.applied,
            root: runtime.root,
            warming_up: self.running && self.elapsed_ms < self.options.warmup_ms,
        })
    }

    /// Reads one configuration field of a configured joint.
    pub fn property(&self, joint: &str, key: PropertyKey) -> Result<Property, ConfigError> {
        let config = &self.runtimes[self.find(joint)?].seed.config;
        Ok(match key {
            PropertyKey::Kind => Property::Kind(config.kind),
            PropertyKey::Stiffness => Property::Stiffness(config.stiffness),
            PropertyKey::Damping => Property::Damping(config.damping),
            PropertyKey::ExternalFactor => Property::ExternalFactor(config.external_factor),
            PropertyKey::Limits => Property::Limits(config.limits),
            PropertyKey::LocalOffset => Property::LocalOffset(config.local_offset),
            PropertyKey::WorldOffset => Property::WorldOffset(config.world_offset),
            PropertyKey::Pivot => Property::Pivot(config.pivot),
            PropertyKey::ExcludeZones => Property::ExcludeZones(config.exclude_zones.clone()),
            PropertyKey::DebugVisible => Property::DebugVisible(config.debug_visible),
        })
    }

    /// Writes one configuration field of a configured joint, with the same
    /// validation as [`setup`](SwaySystem::setup).
    ///
    /// Changing the kind restores the joint to rest and resets its spring
    /// state, since lane meanings differ between kinds. Captured rest data
    /// is never re-read, so this is safe mid-simulation.
    pub fn set_property<S: JointSource>(
        &mut self,
        source: &mut S,
        joint: &str,
        value: Property,
    ) -> Result<(), ConfigError> {
        if !self.configured {
            return Err(ConfigError::NotConfigured);
        }
        let index = self.find(joint)?;
        match value {
            Property::Kind(kind) => {
                let runtime = &self.runtimes[index];
                if runtime.seed.config.pivot && !kind.is_rotational() {
                    return Err(ConfigError::PointPivot { index });
                }
                if kind.is_rotational() && runtime.seed.length < MIN_JOINT_LENGTH {
                    return Err(ConfigError::ZeroLengthJoint {
                        index,
                        name: runtime.seed.config.joint.clone(),
                    });
                }
                pose::restore_rest(source, &runtime.seed);
                let runtime = &mut self.runtimes[index];
                runtime.seed.config.kind = kind;
                runtime.state.reset();
                runtime.applied = [0.0; 4];
            }
            Property::Stiffness(gain) => {
                config::check_gain(index, "stiffness", gain)?;
                self.runtimes[index].seed.config.stiffness = gain;
            }
            Property::Damping(gain) => {
                config::check_gain(index, "damping", gain)?;
                self.runtimes[index].seed.config.damping = gain;
            }
            Property::ExternalFactor(factor) => {
                config::check_external_factor(index, factor)?;
                self.runtimes[index].seed.config.external_factor = factor;
            }
            Property::Limits(limits) => {
                config::check_limits(index, &limits)?;
                self.runtimes[index].seed.config.limits = limits;
            }
            Property::LocalOffset(offset) => {
                config::check_offset(index, "local offset", offset)?;
                self.runtimes[index].seed.config.local_offset = offset;
            }
            Property::WorldOffset(offset) => {
                config::check_offset(index, "world offset", offset)?;
                self.runtimes[index].seed.config.world_offset = offset;
            }
            Property::Pivot(pivot) => {
                if pivot && !self.runtimes[index].seed.config.kind.is_rotational() {
                    return Err(ConfigError::PointPivot { index });
                }
                self.runtimes[index].seed.config.pivot = pivot;
            }
            Property::ExcludeZones(zones) => {
                let built = config::check_zones(source, index, &zones)?;
                let runtime = &mut self.runtimes[index];
                runtime.seed.config.exclude_zones = zones;
                runtime.seed.zones = built;
                self.rebuild_refresh(source);
            }
            Property::DebugVisible(visible) => {
                self.runtimes[index].seed.config.debug_visible = visible;
            }
        }
        Ok(())
    }

    /// Collects debug shapes for joints that opted in, reflecting the state
    /// after the most recent update.
    pub fn debug_primitives<S: JointSource>(&self, source: &S) -> Vec<DebugPrimitive> {
        viz::collect(source, self.runtimes.iter().map(|r| &r.seed))
    }

    fn step_joint<S: JointSource>(&mut self, source: &mut S, index: usize, ds: f32, warming: bool) {
        let (kind, parent_id, gain) = {
            let seed = &self.runtimes[index].seed;
            (
                seed.config.kind,
                seed.parent,
                seed.config.external_factor * self.options.sensitivity,
            )
        };

        // Earlier joints this frame may have moved this joint's ancestors.
        source.refresh_ancestors(parent_id);
        let parent_pos = source.world_position(parent_id);
        let parent_rot = source.world_rotation(parent_id);

        let step = solver::clamp_step(
            parent_pos - self.runtimes[index].prev_parent,
            self.options.max_parent_step,
        );
        let mut stim = solver::stimulus(kind, parent_rot.inverse() * step);

        // Children have not stepped yet, so their velocities are from the
        // previous frame on both sides of the subtraction.
        let share = self.options.child_velocity_share;
        for c in 0..self.runtimes[index].children.len() {
            let child = self.runtimes[index].children[c];
            for lane in 0..4 {
                stim[lane] -= share * self.runtimes[child].state.v[lane] * ds;
            }
        }
        for lane in &mut stim {
            *lane *= gain;
        }

        let runtime = &mut self.runtimes[index];
        runtime.prev_parent = parent_pos;
        solver::integrate(
            &mut runtime.state,
            kind.lane_mask(),
            runtime.seed.config.stiffness.lanes(),
            runtime.seed.config.damping.lanes(),
            stim,
            ds,
        );
        if warming {
            runtime.state.squash(self.options.warmup_scale);
        }
        runtime.applied =
            pose::applied_lanes(&runtime.seed, runtime.state.p, &self.options, parent_rot);

        let runtime = &self.runtimes[index];
        pose::apply(source, &runtime.seed, &self.options, runtime.applied);
        if kind.is_rotational() {
            for zone in &runtime.seed.zones {
                if collision::resolve_zone(source, &runtime.seed, zone) {
                    source.refresh_world(runtime.seed.joint);
                }
            }
        }
    }

    fn rebuild_refresh<S: JointSource>(&mut self, source: &S) {
        self.refresh = topology::refresh_list(
            source,
            self.runtimes.iter().flat_map(|r| {
                std::iter::once(r.seed.joint).chain(r.seed.zones.iter().map(|z| z.obstacle))
            }),
        );
    }

    fn refresh_tracked<S: JointSource>(&self, source: &mut S) {
        for &id in &self.refresh {
            source.refresh_world(id);
        }
    }

    fn resync_parents<S: JointSource>(&mut self, source: &S) {
        for runtime in &mut self.runtimes {
            runtime.prev_parent = source.world_position(runtime.seed.parent);
        }
    }

    fn position(&self, joint: &str) -> Option<usize> {
        self.runtimes
            .iter()
            .position(|r| r.seed.config.joint == joint)
    }

    fn find(&self, joint: &str) -> Result<usize, ConfigError> {
        self.position(joint)
            .ok_or_else(|| ConfigError::UnknownName(joint.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Gain, ZoneConfig, LANE_FORWARD, LANE_LATERAL};
    use approx::assert_relative_eq;
    use glam::Quat;
    use lissom_rig::{Armature, Transform};

    const DT: f32 = 1000.0 / 60.0;

    fn strand_rig() -> Armature {
        let mut arm = Armature::new();
        let root = arm.add_joint("root", None, Transform::IDENTITY);
        let base = arm.add_joint(
            "base",
            Some(root),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        );
        let mid = arm.add_joint(
            "mid",
            Some(base),
            Transform::from_translation(Vec3::new(0.0, 0.4, 0.0)),
        );
        arm.add_joint(
            "tip",
            Some(mid),
            Transform::from_translation(Vec3::new(0.0, 0.4, 0.0)),
        );
        arm.add_joint(
            "gem",
            Some(base),
            Transform::from_translation(Vec3::new(0.05, 0.0, 0.0)),
        );
        arm.add_joint(
            "orb",
            None,
            Transform::from_translation(Vec3::new(0.0, 1.4, 0.05)),
        );
        arm
    }

    fn id(arm: &Armature, name: &str) -> JointId {
        JointSource::joint(arm, name).unwrap()
    }

    #[test]
    fn test_settles_under_constant_world_offset() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        let config = JointConfig::new("mid", JointKind::Link)
            .with_stiffness(5.0)
            .with_damping(2.0)
            .with_world_offset(Vec3::new(0.0, 0.0, -0.1));
        system.setup(&mut arm, &[config]).unwrap();

        // Two seconds at 60 ticks/s, no parent motion.
        for _ in 0..120 {
            system.update(&mut arm, DT).unwrap();
        }

        let state = system.joint_state("mid").unwrap();
        for lane in 0..4 {
            assert!(state.velocity[lane].abs() < 1e-4);
        }
        // The offset reads slightly shorter in the bent parent frame.
        assert!((state.applied[LANE_FORWARD] - 0.1).abs() < 5e-3);
        assert!(JointSource::world_position(&arm, id(&arm, "mid")).z < -0.05);
    }

    #[test]
    fn test_teleport_step_is_clamped() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();

        let root = id(&arm, "root");
        arm.set_local_position(root, Vec3::new(10.0, 0.0, 0.0));
        system.update(&mut arm, DT).unwrap();

        let state = system.joint_state("mid").unwrap();
        // One kick from rest lands at half the (clamped) step.
        assert_relative_eq!(state.position[LANE_LATERAL], 0.25, epsilon = 1e-4);
        assert!(state.position[LANE_LATERAL].abs() <= system.options().max_parent_step);
    }

    #[test]
    fn test_static_rig_stays_at_rest() {
        let mut arm = strand_rig();
        let ids = ["base", "mid", "tip"].map(|n| id(&arm, n));
        let rest: Vec<Vec3> = ids
            .iter()
            .map(|&j| JointSource::world_position(&arm, j))
            .collect();

        let mut system = SwaySystem::default();
        system
            .setup(
                &mut arm,
                &[
                    JointConfig::new("mid", JointKind::Link),
                    JointConfig::new("tip", JointKind::Full),
                ],
            )
            .unwrap();
        for _ in 0..10 {
            system.update(&mut arm, DT).unwrap();
        }
        for (&j, rest) in ids.iter().zip(&rest) {
            let now = JointSource::world_position(&arm, j);
            assert_relative_eq!(now.x, rest.x, epsilon = 1e-6);
            assert_relative_eq!(now.y, rest.y, epsilon = 1e-6);
            assert_relative_eq!(now.z, rest.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_update_errors_before_setup() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        assert!(matches!(
            system.update(&mut arm, DT),
            Err(ConfigError::NotConfigured)
        ));
    }

    #[test]
    fn test_failed_setup_keeps_previous_config() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();

        let err = system
            .setup(
                &mut arm,
                &[
                    JointConfig::new("mid", JointKind::Link),
                    JointConfig::new("nonesuch", JointKind::Link),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownJoint { index: 1, .. }));

        let config = system.config();
        assert_eq!(config.len(), 1);
        assert_eq!(config[0].joint, "mid");
        assert!(system.is_running());
        system.update(&mut arm, DT).unwrap();
    }

    #[test]
    fn test_config_round_trip_preserves_declaration_order() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        let configs = vec![
            JointConfig::new("tip", JointKind::Full)
                .with_stiffness([6.0, 6.0, 4.0, 3.0])
                .with_limit(LANE_FORWARD, -0.2, 0.2),
            JointConfig::ponytail("mid"),
        ];
        system.setup(&mut arm, &configs).unwrap();
        assert_eq!(system.config(), configs);
    }

    #[test]
    fn test_joint_names_follow_simulation_order() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        system
            .setup(
                &mut arm,
                &[
                    JointConfig::new("tip", JointKind::Link),
                    JointConfig::new("mid", JointKind::Link),
                ],
            )
            .unwrap();
        assert_eq!(system.joint_names(), ["mid", "tip"]);
        assert_eq!(system.config()[0].joint, "tip");
    }

    #[test]
    fn test_property_round_trip_and_validation() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();

        system
            .set_property(
                &mut arm,
                "mid",
                Property::Stiffness(Gain::Lanes([9.0, 9.0, 5.0, 2.0])),
            )
            .unwrap();
        assert_eq!(
            system.property("mid", PropertyKey::Stiffness).unwrap(),
            Property::Stiffness(Gain::Lanes([9.0, 9.0, 5.0, 2.0]))
        );

        assert!(matches!(
            system.set_property(&mut arm, "mid", Property::Damping(Gain::Uniform(-1.0))),
            Err(ConfigError::InvalidGain { .. })
        ));
        assert!(matches!(
            system.property("nonesuch", PropertyKey::Kind),
            Err(ConfigError::UnknownName(_))
        ));

        system
            .set_property(&mut arm, "mid", Property::Pivot(true))
            .unwrap();
        // A pivoting joint cannot become a point joint.
        assert!(matches!(
            system.set_property(&mut arm, "mid", Property::Kind(JointKind::Point)),
            Err(ConfigError::PointPivot { .. })
        ));
    }

    #[test]
    fn test_kind_change_resets_spring_state() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();

        let root = id(&arm, "root");
        arm.set_local_position(root, Vec3::new(0.1, 0.0, 0.0));
        system.update(&mut arm, DT).unwrap();
        assert!(system.joint_state("mid").unwrap().position[LANE_LATERAL].abs() > 1e-3);

        system
            .set_property(&mut arm, "mid", Property::Kind(JointKind::Full))
            .unwrap();
        let state = system.joint_state("mid").unwrap();
        assert_eq!(state.kind, JointKind::Full);
        assert_eq!(state.position, [0.0; 4]);
    }

    #[test]
    fn test_frame_delta_guards() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();

        // 70 frames pushes past the warm-up window.
        for _ in 0..70 {
            system.update(&mut arm, DT).unwrap();
        }
        assert!(!system.joint_state("mid").unwrap().warming_up);

        let before = system.joint_state("mid").unwrap();
        system.update(&mut arm, 0.0).unwrap();
        system.update(&mut arm, -5.0).unwrap();
        system.update(&mut arm, f32::NAN).unwrap();
        assert_eq!(system.joint_state("mid").unwrap(), before);

        // An oversized delta skips the frame and re-arms warm-up.
        let root = id(&arm, "root");
        arm.set_local_position(root, Vec3::new(3.0, 0.0, 0.0));
        system.update(&mut arm, 5000.0).unwrap();
        assert!(system.joint_state("mid").unwrap().warming_up);
        system.update(&mut arm, DT).unwrap();
        // The teleport was absorbed by the resync, not integrated.
        assert!(system.joint_state("mid").unwrap().position[LANE_LATERAL].abs() < 1e-3);
    }

    #[test]
    fn test_stop_restores_rest_and_halts() {
        let mut arm = strand_rig();
        let mid = id(&arm, "mid");
        let rest = JointSource::world_position(&arm, mid);

        let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();
        let root = id(&arm, "root");
        arm.set_local_position(root, Vec3::new(0.3, 0.0, 0.0));
        system.update(&mut arm, DT).unwrap();

        system.stop(&mut arm);
        assert!(!system.is_running());
        let now = JointSource::world_position(&arm, mid);
        assert_relative_eq!(now.x, rest.x + 0.3, epsilon = 1e-6);
        assert_relative_eq!(now.y, rest.y, epsilon = 1e-6);
        assert_relative_eq!(now.z, rest.z, epsilon = 1e-6);

        // Stopped systems accept updates but do nothing.
        system.update(&mut arm, DT).unwrap();
        assert!(!system.is_running());
    }

    #[test]
    fn test_start_rearms_from_rest() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();
        let root = id(&arm, "root");
        arm.set_local_position(root, Vec3::new(0.3, 0.0, 0.0));
        system.update(&mut arm, DT).unwrap();
        system.stop(&mut arm);

        system.start(&mut arm).unwrap();
        assert!(system.is_running());
        assert_eq!(system.joint_state("mid").unwrap().position, [0.0; 4]);
        // The teleport happened before start, so it is not re-integrated.
        system.update(&mut arm, DT).unwrap();
        assert!(system.joint_state("mid").unwrap().position[LANE_LATERAL].abs() < 1e-6);
    }

    #[test]
    fn test_dispose_clears_configuration() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();
        system.dispose(&mut arm);

        assert!(!system.is_running());
        assert!(system.config().is_empty());
        assert!(system.joint_names().is_empty());
        assert!(system.joint_state("mid").is_none());
        assert!(matches!(
            system.update(&mut arm, DT),
            Err(ConfigError::NotConfigured)
        ));
    }

    #[test]
    fn test_exclusion_zone_holds_joint_out() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        let config =
            JointConfig::new("mid", JointKind::Link).with_zone(ZoneConfig::new("orb", 0.2));
        system.setup(&mut arm, &[config]).unwrap();

        for _ in 0..5 {
            system.update(&mut arm, DT).unwrap();
        }
        let mid_world = JointSource::world_position(&arm, id(&arm, "mid"));
        let orb_world = JointSource::world_position(&arm, id(&arm, "orb"));
        assert!(mid_world.distance(orb_world) >= 0.2 - 1e-3);
        assert!(mid_world.z < 0.0);
    }

    #[test]
    fn test_point_joint_translates_componentwise() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
        system
            .setup(&mut arm, &[JointConfig::new("gem", JointKind::Point)])
            .unwrap();

        let root = id(&arm, "root");
        arm.set_local_position(root, Vec3::new(0.2, 0.0, 0.0));
        system.update(&mut arm, DT).unwrap();

        let local = JointSource::local_position(&arm, id(&arm, "gem"));
        assert_relative_eq!(local.x, 0.15, epsilon = 1e-4);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(local.z, 0.0, epsilon = 1e-6);
        // Rotation channel is untouched for point joints.
        assert_eq!(
            JointSource::local_rotation(&arm, id(&arm, "base")),
            Quat::IDENTITY
        );
    }

    #[test]
    fn test_child_velocity_feeds_back_into_parent() {
        let run = |configs: &[JointConfig]| {
            let mut arm = strand_rig();
            let mut system = SwaySystem::new(SwayOptions::default().with_warmup_ms(0.0));
            system.setup(&mut arm, configs).unwrap();
            let root = id(&arm, "root");
            arm.set_local_position(root, Vec3::new(0.3, 0.0, 0.0));
            system.update(&mut arm, DT).unwrap();
            system.update(&mut arm, DT).unwrap();
            system.joint_state("mid").unwrap().position[LANE_LATERAL]
        };

        let chained = run(&[
            JointConfig::new("mid", JointKind::Link),
            JointConfig::new("tip", JointKind::Link),
        ]);
        let alone = run(&[JointConfig::new("mid", JointKind::Link)]);
        assert!((chained - alone).abs() > 1e-3);
    }

    #[test]
    fn test_debug_primitives_reflect_visibility() {
        let mut arm = strand_rig();
        let mut system = SwaySystem::default();
        system
            .setup(&mut arm, &[JointConfig::new("mid", JointKind::Link)])
            .unwrap();
        assert!(system.debug_primitives(&arm).is_empty());

        system
            .set_property(&mut arm, "mid", Property::DebugVisible(true))
            .unwrap();
        assert_eq!(system.debug_primitives(&arm).len(), 2);
    }
}
