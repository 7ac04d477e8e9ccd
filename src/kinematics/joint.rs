use glam::{Quat, Vec3};

use crate::math::Transform;

/// Index of a joint inside its [`KinematicTree`](super::KinematicTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub(crate) usize);

/// Index of a link inside its [`KinematicTree`](super::KinematicTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub(crate) usize);

impl JointId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    /// Bounded rotation about the joint axis.
    Revolute,
    /// Unbounded rotation about the joint axis.
    Continuous,
    /// Bounded translation along the joint axis.
    Prismatic,
    /// Rigid connection, never manipulable.
    Fixed,
}

impl JointKind {
    pub fn is_manipulable(self) -> bool {
        !matches!(self, JointKind::Fixed)
    }

    pub fn is_rotational(self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Continuous)
    }

    /// Whether limits, when present, constrain this kind of joint.
    pub fn honours_limits(self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub lower: f32,
    pub upper: f32,
}

impl JointLimits {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) name: String,
    pub(crate) kind: JointKind,
    pub(crate) axis: Option<Vec3>,
    /// Axis used when `axis` is missing or zero; set by the tree builder.
    pub(crate) default_axis: Vec3,
    pub(crate) limits: Option<JointLimits>,
    pub(crate) value: f32,
    pub(crate) origin: Transform,
    pub(crate) parent: LinkId,
    pub(crate) child: LinkId,
}

impl Joint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    /// Local motion axis as declared by the model, if any.
    pub fn axis(&self) -> Option<Vec3> {
        self.axis
    }

    /// Local motion axis with the fallback applied and normalized.
    pub fn axis_or(&self, fallback: Vec3) -> Vec3 {
        self.axis
            .and_then(Vec3::try_normalize)
            .unwrap_or(fallback)
    }

    /// Normalized local axis the joint actually moves along.
    pub fn motion_axis(&self) -> Vec3 {
        self.axis_or(self.default_axis)
    }

    pub fn limits(&self) -> Option<JointLimits> {
        self.limits
    }

    /// Radians for rotational joints, length units for prismatic ones.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Fixed offset from the parent link frame to this joint's frame.
    pub fn origin(&self) -> Transform {
        self.origin
    }

    pub fn parent_link(&self) -> LinkId {
        self.parent
    }

    pub fn child_link(&self) -> LinkId {
        self.child
    }

    pub fn is_manipulable(&self) -> bool {
        self.kind.is_manipulable()
    }

    /// Clamps `value` to the joint's limits when its kind honours them.
    pub fn clamp_value(&self, value: f32) -> f32 {
        match self.limits {
            Some(limits) if self.kind.honours_limits() => limits.clamp(value),
            _ => value,
        }
    }

    /// Motion contributed by the current value, in the joint frame.
    pub fn motion(&self) -> Transform {
        let axis = self.motion_axis();
        match self.kind {
            JointKind::Revolute | JointKind::Continuous => {
                Transform::from_rotation(Quat::from_axis_angle(axis, self.value))
            }
            JointKind::Prismatic => Transform::from_position(axis * self.value),
            JointKind::Fixed => Transform::IDENTITY,
        }
    }
}
