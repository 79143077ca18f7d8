//! Joint arena with cached world transforms.

use crate::transform::Transform;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A joint identifier (index into an armature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointId(pub u32);

impl JointId {
    /// Creates a new joint ID.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A joint in an armature.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Human-readable name.
    pub name: String,
    /// Parent joint (None for root).
    pub parent: Option<JointId>,
    /// Local transform in parent space.
    pub local: Transform,
    /// Cached world transform, valid until `local` changes.
    world: Transform,
}

impl Joint {
    /// Returns the cached world transform.
    pub fn world(&self) -> Transform {
        self.world
    }
}

/// A flat hierarchy of joints.
///
/// Joints are stored parents-first: `add_joint` requires the parent to exist
/// already, so ascending-id iteration always visits a joint after all of its
/// ancestors. World transforms are cached; mutating a joint's local transform
/// leaves its subtree stale until one of the `refresh_*` methods runs.
#[derive(Debug, Clone, Default)]
pub struct Armature {
    joints: Vec<Joint>,
}

impl Armature {
    /// Creates an empty armature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a joint under `parent` and returns its ID.
    ///
    /// The parent must already be in the armature. The new joint's world
    /// transform is computed immediately.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<JointId>,
        local: Transform,
    ) -> JointId {
        debug_assert!(
            parent.map_or(true, |p| p.index() < self.joints.len()),
            "parent joint must be added before its children"
        );
        let world = match parent.and_then(|p| self.joints.get(p.index())) {
            Some(p) => p.world.then(&local),
            None => local,
        };
        let id = JointId(self.joints.len() as u32);
        self.joints.push(Joint {
            name: name.into(),
            parent,
            local,
            world,
        });
        id
    }

    /// Returns the number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Returns true if the armature has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Returns a joint by ID.
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    /// Returns a mutable joint by ID.
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.index())
    }

    /// Returns all joints.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Finds a joint by name.
    pub fn joint_id(&self, name: &str) -> Option<JointId> {
        self.joints
            .iter()
            .position(|j| j.name == name)
            .map(|i| JointId(i as u32))
    }

    /// Returns children of a joint.
    pub fn children(&self, parent: JointId) -> Vec<JointId> {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, j)| j.parent == Some(parent))
            .map(|(i, _)| JointId(i as u32))
            .collect()
    }

    /// Returns the cached world transform of a joint.
    pub fn world(&self, id: JointId) -> Transform {
        self.joints
            .get(id.index())
            .map(|j| j.world)
            .unwrap_or(Transform::IDENTITY)
    }

    /// Recomputes one joint's world transform from its parent's cached one.
    pub fn refresh_world(&mut self, id: JointId) {
        let Some(joint) = self.joints.get(id.index()) else {
            return;
        };
        let world = match joint.parent.and_then(|p| self.joints.get(p.index())) {
            Some(p) => p.world.then(&joint.local),
            None => joint.local,
        };
        self.joints[id.index()].world = world;
    }

    /// Recomputes world transforms along the root-to-joint chain.
    pub fn refresh_ancestors(&mut self, id: JointId) {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(joint_id) = current {
            chain.push(joint_id);
            current = self.joints.get(joint_id.index()).and_then(|j| j.parent);
        }
        for joint_id in chain.into_iter().rev() {
            self.refresh_world(joint_id);
        }
    }

    /// Recomputes every world transform, parents first.
    pub fn refresh_all(&mut self) {
        for i in 0..self.joints.len() {
            self.refresh_world(JointId(i as u32));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn simple_armature() -> (Armature, JointId, JointId, JointId) {
        let mut arm = Armature::new();
        let root = arm.add_joint("root", None, Transform::IDENTITY);
        let upper = arm.add_joint(
            "upper",
            Some(root),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        );
        let lower = arm.add_joint(
            "lower",
            Some(upper),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        );
        (arm, root, upper, lower)
    }

    #[test]
    fn test_armature_creation() {
        let (arm, root, upper, lower) = simple_armature();

        assert_eq!(arm.len(), 3);
        assert_eq!(arm.joint(root).unwrap().name, "root");
        assert_eq!(arm.joint(upper).unwrap().parent, Some(root));
        assert_eq!(arm.joint(lower).unwrap().parent, Some(upper));
    }

    #[test]
    fn test_joint_id_lookup() {
        let (arm, _, upper, _) = simple_armature();

        assert_eq!(arm.joint_id("upper"), Some(upper));
        assert_eq!(arm.joint_id("nonexistent"), None);
    }

    #[test]
    fn test_children() {
        let (arm, root, upper, lower) = simple_armature();

        assert_eq!(arm.children(root), vec![upper]);
        assert_eq!(arm.children(upper), vec![lower]);
        assert_eq!(arm.children(lower), Vec::<JointId>::new());
    }

    #[test]
    fn test_worlds_valid_after_add() {
        let (arm, root, upper, lower) = simple_armature();

        assert_eq!(arm.world(root).translation, Vec3::ZERO);
        assert_eq!(arm.world(upper).translation, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(arm.world(lower).translation, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_refresh_after_local_edit() {
        let (mut arm, _, upper, lower) = simple_armature();

        arm.joint_mut(upper).unwrap().local.rotation = Quat::from_rotation_z(FRAC_PI_2);
        // Cache is stale until refreshed
        assert_eq!(arm.world(lower).translation, Vec3::new(0.0, 2.0, 0.0));

        arm.refresh_world(upper);
        arm.refresh_world(lower);
        let world = arm.world(lower).translation;
        assert!((world.x - (-1.0)).abs() < 0.0001);
        assert!((world.y - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_refresh_ancestors() {
        let (mut arm, root, _, lower) = simple_armature();

        arm.joint_mut(root).unwrap().local.translation = Vec3::new(5.0, 0.0, 0.0);
        arm.refresh_ancestors(lower);
        assert_eq!(arm.world(lower).translation, Vec3::new(5.0, 2.0, 0.0));
    }

    #[test]
    fn test_refresh_all() {
        let (mut arm, root, upper, lower) = simple_armature();

        arm.joint_mut(root).unwrap().local.translation = Vec3::new(1.0, 0.0, 0.0);
        arm.joint_mut(upper).unwrap().local.translation = Vec3::new(0.0, 2.0, 0.0);
        arm.refresh_all();
        assert_eq!(arm.world(lower).translation, Vec3::new(1.0, 3.0, 0.0));
    }
}
