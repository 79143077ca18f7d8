//! Joint hierarchies for procedural animation.
//!
//! Provides a flat-arena [`Armature`] with cached world transforms, the rigid
//! [`Transform`] type, and the [`JointSource`] trait that simulation crates
//! consume instead of a concrete scene graph.
//!
//! # Example
//!
//! ```
//! use lissom_rig::{Armature, JointSource, Transform};
//! use glam::Vec3;
//!
//! let mut arm = Armature::new();
//! let hips = arm.add_joint("hips", None, Transform::IDENTITY);
//! let spine = arm.add_joint(
//!     "spine",
//!     Some(hips),
//!     Transform::from_translation(Vec3::new(0.0, 0.2, 0.0)),
//! );
//!
//! // Drive the root, then refresh the chain
//! arm.set_local_position(hips, Vec3::new(0.0, 1.0, 0.0));
//! arm.refresh_ancestors(spine);
//! assert_eq!(arm.world_position(spine), Vec3::new(0.0, 1.2, 0.0));
//! ```

mod armature;
mod source;
mod transform;

pub use armature::{Armature, Joint, JointId};
pub use source::JointSource;
pub use transform::Transform;
