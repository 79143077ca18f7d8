//! Secondary motion for joint hierarchies: hair, tails, ears, and dangling
//! accessories that react to a character's movement.
//!
//! Each configured joint carries a small bank of damped springs fed by its
//! parent's world-space motion. Every frame the springs displace the joint
//! from its rest pose: rotational kinds bend, stretch, and twist the bone,
//! point kinds translate it. Spherical exclusion zones keep joints out of
//! body parts they would otherwise clip through.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use lissom_rig::{Armature, Transform};
//! use lissom_sway::{JointConfig, JointKind, SwaySystem};
//!
//! let mut arm = Armature::new();
//! let hips = arm.add_joint("hips", None, Transform::IDENTITY);
//! arm.add_joint(
//!     "tail",
//!     Some(hips),
//!     Transform::from_translation(Vec3::new(0.0, 0.0, -0.3)),
//! );
//!
//! let mut sway = SwaySystem::default();
//! sway.setup(&mut arm, &[JointConfig::hair("tail")])?;
//!
//! // Animate the hips however the host likes, then step with the frame
//! // delta in milliseconds.
//! for _ in 0..3 {
//!     sway.update(&mut arm, 1000.0 / 60.0)?;
//! }
//! assert_eq!(sway.joint_state("tail").unwrap().kind, JointKind::Link);
//! # Ok::<(), lissom_sway::ConfigError>(())
//! ```

mod collision;
mod config;
mod engine;
mod error;
mod pose;
mod property;
mod solver;
mod topology;
mod viz;

pub use config::{
    Gain, JointConfig, JointKind, Limit, SwayOptions, ZoneConfig, LANE_FORWARD, LANE_LATERAL,
    LANE_STRETCH, LANE_TWIST,
};
pub use engine::{JointState, SwaySystem};
pub use error::ConfigError;
pub use property::{Property, PropertyKey};
pub use viz::DebugPrimitive;
