use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use thiserror::Error;

use super::joint::{Joint, JointId, JointKind, JointLimits, LinkId};
use crate::math::Transform;
use crate::picking::Shape;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one constructed tree. A reloaded model always gets a new id,
/// which is how stale joint references are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    #[error("unknown link `{link}` referenced by `{referenced_by}`")]
    UnknownLink { link: String, referenced_by: String },

    #[error("link `{0}` is declared more than once")]
    DuplicateLink(String),

    #[error("joint `{0}` is declared more than once")]
    DuplicateJoint(String),

    #[error("link `{link}` has two parent joints: `{first}` and `{second}`")]
    MultipleParents {
        link: String,
        first: String,
        second: String,
    },

    #[error("root link `{link}` cannot be the child of joint `{joint}`")]
    RootHasParent { link: String, joint: String },

    #[error("link `{0}` is not reachable from the root")]
    Unreachable(String),

    #[error("joint `{joint}` has invalid limits [{lower}, {upper}]")]
    InvalidLimits { joint: String, lower: f32, upper: f32 },
}

#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) name: String,
    pub(crate) parent_joint: Option<JointId>,
    pub(crate) child_joints: Vec<JointId>,
}

impl Link {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_joint(&self) -> Option<JointId> {
        self.parent_joint
    }

    pub fn child_joints(&self) -> &[JointId] {
        &self.child_joints
    }
}

/// A manipulable surface: a shape attached to a link, in link-local space.
#[derive(Debug, Clone)]
pub struct Surface {
    pub link: LinkId,
    pub shape: Box<dyn Shape>,
}

/// Rooted tree of links connected by joints, as produced by a model loader.
pub struct KinematicTree {
    id: TreeId,
    root: LinkId,
    base: Transform,
    links: Vec<Link>,
    joints: Vec<Joint>,
    surfaces: Vec<Surface>,
    /// Joints ordered parent-first for forward kinematics.
    order: Vec<JointId>,
    link_world: Vec<Transform>,
}

impl KinematicTree {
    pub fn builder(root_link: impl Into<String>) -> TreeBuilder {
        TreeBuilder::new(root_link)
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> LinkId {
        self.root
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_ids(&self) -> impl Iterator<Item = JointId> + '_ {
        (0..self.joints.len()).map(JointId)
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn joint_by_name(&self, name: &str) -> Option<JointId> {
        self.joints.iter().position(|j| j.name == name).map(JointId)
    }

    pub fn link_by_name(&self, name: &str) -> Option<LinkId> {
        self.links.iter().position(|l| l.name == name).map(LinkId)
    }

    /// The joint whose child is `link`, or `None` for the root.
    pub fn parent_joint_of(&self, link: LinkId) -> Option<JointId> {
        self.links.get(link.0).and_then(|l| l.parent_joint)
    }

    pub fn base_transform(&self) -> Transform {
        self.base
    }

    pub fn set_base_transform(&mut self, base: Transform) {
        self.base = base;
        self.refresh_world_transforms();
    }

    pub fn link_world_transform(&self, link: LinkId) -> Option<Transform> {
        self.link_world.get(link.0).copied()
    }

    /// World frame of the joint itself: parent link pose composed with the
    /// joint origin. The joint's own motion is not included, so the pivot
    /// and axis stay put while the joint moves.
    pub fn joint_world_transform(&self, id: JointId) -> Option<Transform> {
        let joint = self.joints.get(id.0)?;
        let parent = self.link_world.get(joint.parent.0)?;
        Some(parent.mul_transform(&joint.origin))
    }

    /// Applies a new value, clamped to the joint's limits. Returns `false`
    /// for unknown or fixed joints.
    pub fn set_joint_value(&mut self, id: JointId, value: f32) -> bool {
        let Some(joint) = self.joints.get_mut(id.0) else {
            return false;
        };
        if !joint.is_manipulable() || !value.is_finite() {
            return false;
        }
        joint.value = joint.clamp_value(value);
        self.refresh_world_transforms();
        true
    }

    pub fn set_joint_value_by_name(&mut self, name: &str, value: f32) -> bool {
        match self.joint_by_name(name) {
            Some(id) => self.set_joint_value(id, value),
            None => false,
        }
    }

    fn refresh_world_transforms(&mut self) {
        self.link_world[self.root.0] = self.base;
        for &id in &self.order {
            let joint = &self.joints[id.0];
            let parent = self.link_world[joint.parent.0];
            self.link_world[joint.child.0] = parent
                .mul_transform(&joint.origin)
                .mul_transform(&joint.motion());
        }
    }
}

impl std::fmt::Debug for KinematicTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KinematicTree")
            .field("id", &self.id)
            .field("link_count", &self.links.len())
            .field("joint_count", &self.joints.len())
            .field("surface_count", &self.surfaces.len())
            .finish()
    }
}

/// Declarative description of one joint, consumed by [`TreeBuilder`].
#[derive(Debug, Clone)]
pub struct JointSpec {
    name: String,
    kind: JointKind,
    parent: String,
    child: String,
    axis: Option<Vec3>,
    limits: Option<(f32, f32)>,
    origin: Transform,
    value: f32,
}

impl JointSpec {
    pub fn new(
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: parent.into(),
            child: child.into(),
            axis: None,
            limits: None,
            origin: Transform::IDENTITY,
            value: 0.0,
        }
    }

    pub fn revolute(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(name, JointKind::Revolute, parent, child)
    }

    pub fn continuous(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(name, JointKind::Continuous, parent, child)
    }

    pub fn prismatic(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(name, JointKind::Prismatic, parent, child)
    }

    pub fn fixed(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(name, JointKind::Fixed, parent, child)
    }

    pub fn axis(mut self, axis: Vec3) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some((lower, upper));
        self
    }

    pub fn origin(mut self, origin: Transform) -> Self {
        self.origin = origin;
        self
    }

    pub fn value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }
}

pub struct TreeBuilder {
    root: String,
    links: Vec<String>,
    joints: Vec<JointSpec>,
    surfaces: Vec<(String, Box<dyn Shape>)>,
    base: Transform,
    default_axis: Vec3,
}

impl TreeBuilder {
    pub fn new(root_link: impl Into<String>) -> Self {
        Self {
            root: root_link.into(),
            links: Vec::new(),
            joints: Vec::new(),
            surfaces: Vec::new(),
            base: Transform::IDENTITY,
            default_axis: Vec3::X,
        }
    }

    pub fn link(mut self, name: impl Into<String>) -> Self {
        self.links.push(name.into());
        self
    }

    pub fn joint(mut self, spec: JointSpec) -> Self {
        self.joints.push(spec);
        self
    }

    pub fn surface<S: Shape + 'static>(mut self, link: impl Into<String>, shape: S) -> Self {
        self.surfaces.push((link.into(), Box::new(shape)));
        self
    }

    pub fn base(mut self, base: Transform) -> Self {
        self.base = base;
        self
    }

    /// Local axis for joints that declare none (or a zero one). Defaults to +X.
    pub fn default_axis(mut self, axis: Vec3) -> Self {
        self.default_axis = axis.try_normalize().unwrap_or(Vec3::X);
        self
    }

    pub fn build(self) -> Result<KinematicTree, TreeError> {
        let mut links = Vec::with_capacity(self.links.len() + 1);
        let mut link_index: HashMap<String, LinkId> = HashMap::new();

        for name in std::iter::once(self.root.clone()).chain(self.links) {
            if link_index.contains_key(&name) {
                return Err(TreeError::DuplicateLink(name));
            }
            link_index.insert(name.clone(), LinkId(links.len()));
            links.push(Link {
                name,
                parent_joint: None,
                child_joints: Vec::new(),
            });
        }

        let lookup = |link: &str, referenced_by: &str| {
            link_index
                .get(link)
                .copied()
                .ok_or_else(|| TreeError::UnknownLink {
                    link: link.to_string(),
                    referenced_by: referenced_by.to_string(),
                })
        };

        let root = LinkId(0);
        let mut joints: Vec<Joint> = Vec::with_capacity(self.joints.len());

        for spec in self.joints {
            if joints.iter().any(|j| j.name == spec.name) {
                return Err(TreeError::DuplicateJoint(spec.name));
            }

            let parent = lookup(&spec.parent, &spec.name)?;
            let child = lookup(&spec.child, &spec.name)?;

            if child == root {
                return Err(TreeError::RootHasParent {
                    link: spec.child,
                    joint: spec.name,
                });
            }
            if let Some(existing) = links[child.0].parent_joint {
                return Err(TreeError::MultipleParents {
                    link: spec.child,
                    first: joints[existing.0].name.clone(),
                    second: spec.name,
                });
            }

            let limits = match spec.limits {
                Some((lower, upper)) => {
                    if !lower.is_finite() || !upper.is_finite() || lower > upper {
                        return Err(TreeError::InvalidLimits {
                            joint: spec.name,
                            lower,
                            upper,
                        });
                    }
                    Some(JointLimits::new(lower, upper))
                }
                None => None,
            };

            let id = JointId(joints.len());
            links[child.0].parent_joint = Some(id);
            links[parent.0].child_joints.push(id);

            let mut joint = Joint {
                name: spec.name,
                kind: spec.kind,
                axis: spec.axis,
                default_axis: self.default_axis,
                limits,
                value: 0.0,
                origin: spec.origin,
                parent,
                child,
            };
            if joint.is_manipulable() {
                joint.value = joint.clamp_value(spec.value);
            }
            joints.push(joint);
        }

        let mut order = Vec::with_capacity(joints.len());
        let mut reached = vec![false; links.len()];
        let mut queue = VecDeque::from([root]);
        reached[root.0] = true;

        while let Some(link) = queue.pop_front() {
            for &joint in &links[link.0].child_joints {
                let child = joints[joint.0].child;
                if !reached[child.0] {
                    reached[child.0] = true;
                    order.push(joint);
                    queue.push_back(child);
                }
            }
        }

        if let Some(idx) = reached.iter().position(|r| !r) {
            return Err(TreeError::Unreachable(links[idx].name.clone()));
        }

        let mut surfaces = Vec::with_capacity(self.surfaces.len());
        for (link, shape) in self.surfaces {
            let link = lookup(&link, "surface")?;
            surfaces.push(Surface { link, shape });
        }

        let link_count = links.len();
        let mut tree = KinematicTree {
            id: TreeId::next(),
            root,
            base: self.base,
            links,
            joints,
            surfaces,
            order,
            link_world: vec![Transform::IDENTITY; link_count],
        };
        tree.refresh_world_transforms();
        Ok(tree)
    }
}
