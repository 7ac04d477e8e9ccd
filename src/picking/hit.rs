use super::raycast::{Ray, RayHit};
use crate::kinematics::{JointId, KinematicTree, LinkId};

/// Joint resolved under the pointer, with the surface hit that found it.
#[derive(Debug, Clone, Copy)]
pub struct PickResult {
    pub joint: JointId,
    pub link: LinkId,
    /// World-space hit on the struck surface.
    pub hit: RayHit,
}

pub struct HitTester;

impl HitTester {
    /// Casts `ray` against every surface of `tree` and returns the index of
    /// the closest one with its world-space hit.
    pub fn raycast(tree: &KinematicTree, ray: &Ray) -> Option<(usize, RayHit)> {
        let mut closest: Option<(usize, RayHit)> = None;

        for (i, surface) in tree.surfaces().iter().enumerate() {
            let Some(link_world) = tree.link_world_transform(surface.link) else {
                continue;
            };
            let matrix = link_world.to_matrix();
            if matrix.determinant().abs() < 1e-12 {
                continue;
            }

            let local_ray = ray.transformed(&matrix.inverse());
            let Some(local_hit) = surface.shape.ray_intersect(&local_ray) else {
                continue;
            };

            let hit = RayHit {
                t: local_hit.t,
                point: ray.at(local_hit.t),
                normal: link_world
                    .transform_direction(local_hit.normal)
                    .normalize_or_zero(),
            };

            match &closest {
                None => closest = Some((i, hit)),
                Some((_, prev_hit)) if hit.t < prev_hit.t => {
                    closest = Some((i, hit));
                }
                _ => {}
            }
        }

        closest
    }

    /// Walks from `link` towards the root and returns the first joint that
    /// can be manipulated. Fixed joints are passed through.
    pub fn owning_joint(tree: &KinematicTree, link: LinkId) -> Option<JointId> {
        let mut current = link;
        while let Some(joint_id) = tree.parent_joint_of(current) {
            let joint = tree.joint(joint_id)?;
            if joint.is_manipulable() {
                return Some(joint_id);
            }
            current = joint.parent_link();
        }
        None
    }

    /// Closest surface under `ray`, resolved to its owning joint. A closest
    /// hit whose chain holds no manipulable joint yields `None`; surfaces
    /// further along the ray are not consulted.
    pub fn pick(tree: &KinematicTree, ray: &Ray) -> Option<PickResult> {
        let (index, hit) = Self::raycast(tree, ray)?;
        let link = tree.surfaces()[index].link;
        let joint = Self::owning_joint(tree, link)?;
        Some(PickResult { joint, link, hit })
    }
}
