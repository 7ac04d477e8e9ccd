use glam::Vec3;

use crate::kinematics::{JointId, KinematicTree};

/// World-space motion axis of `joint` in the tree's current pose.
///
/// The local motion axis (the tree's default axis when the joint declares
/// none) is turned
/// by the rotation part of the joint's world transform; translation and
/// scale are ignored. Sessions call this once at grab time and keep the
/// result for the whole drag.
pub fn resolve_world_axis(tree: &KinematicTree, joint: JointId) -> Option<Vec3> {
    let local = tree.joint(joint)?.motion_axis();
    let world = tree.joint_world_transform(joint)?;
    world
        .rotation_only()
        .transform_direction(local)
        .try_normalize()
}
