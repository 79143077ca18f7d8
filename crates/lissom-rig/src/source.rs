//! Abstract joint access for simulation consumers.

use crate::armature::{Armature, JointId};
use glam::{Quat, Vec3};

/// Read/write access to a joint hierarchy.
///
/// Simulation code is written against this trait rather than [`Armature`]
/// directly, so hosts can adapt their own scene graphs. World transforms are
/// cached by the implementor; callers that change local transforms (or know
/// the host animation did) must request a refresh before reading worlds.
///
/// Lookups with a stale or foreign [`JointId`] degrade to identity values
/// rather than panicking; consumers resolve names to IDs up front and treat
/// those IDs as valid for the armature they came from.
pub trait JointSource {
    /// Resolves a joint name to its ID.
    fn joint(&self, name: &str) -> Option<JointId>;

    /// Returns true if a joint with this name exists.
    fn contains(&self, name: &str) -> bool {
        self.joint(name).is_some()
    }

    /// Returns the parent of a joint.
    fn parent(&self, id: JointId) -> Option<JointId>;

    /// Returns a joint's local-space position.
    fn local_position(&self, id: JointId) -> Vec3;

    /// Sets a joint's local-space position without refreshing worlds.
    fn set_local_position(&mut self, id: JointId, position: Vec3);

    /// Returns a joint's local-space rotation.
    fn local_rotation(&self, id: JointId) -> Quat;

    /// Sets a joint's local-space rotation without refreshing worlds.
    fn set_local_rotation(&mut self, id: JointId, rotation: Quat);

    /// Returns a joint's cached world-space position.
    fn world_position(&self, id: JointId) -> Vec3;

    /// Returns a joint's cached world-space rotation.
    fn world_rotation(&self, id: JointId) -> Quat;

    /// Recomputes one joint's world transform from its parent's cached one.
    fn refresh_world(&mut self, id: JointId);

    /// Recomputes world transforms along the root-to-joint chain.
    fn refresh_ancestors(&mut self, id: JointId);
}

impl JointSource for Armature {
    fn joint(&self, name: &str) -> Option<JointId> {
        self.joint_id(name)
    }

    fn parent(&self, id: JointId) -> Option<JointId> {
        self.joint(id).and_then(|j| j.parent)
    }

    fn local_position(&self, id: JointId) -> Vec3 {
        self.joint(id).map(|j| j.local.translation).unwrap_or(Vec3::ZERO)
    }

    fn set_local_position(&mut self, id: JointId, position: Vec3) {
        if let Some(joint) = self.joint_mut(id) {
            joint.local.translation = position;
        }
    }

    fn local_rotation(&self, id: JointId) -> Quat {
        self.joint(id).map(|j| j.local.rotation).unwrap_or(Quat::IDENTITY)
    }

    fn set_local_rotation(&mut self, id: JointId, rotation: Quat) {
        if let Some(joint) = self.joint_mut(id) {
            joint.local.rotation = rotation;
        }
    }

    fn world_position(&self, id: JointId) -> Vec3 {
        self.world(id).translation
    }

    fn world_rotation(&self, id: JointId) -> Quat {
        self.world(id).rotation
    }

    fn refresh_world(&mut self, id: JointId) {
        Armature::refresh_world(self, id);
    }

    fn refresh_ancestors(&mut self, id: JointId) {
        Armature::refresh_ancestors(self, id);
    }
}
