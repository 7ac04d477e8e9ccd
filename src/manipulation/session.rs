use glam::Vec3;

use super::axis::resolve_world_axis;
use super::config::ManipulationConfig;
use super::events::JointHandle;
use super::solver::DragSolver;
use crate::kinematics::{JointKind, KinematicTree};
use crate::picking::Ray;

/// Result of evaluating one pointer ray against a session, before anything
/// is written to the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragStep {
    /// No usable intersection this frame (parallel ray, behind the origin or
    /// degenerate projection). Nothing changes.
    Skipped,
    /// First usable point of the session; becomes the reference point.
    Anchored(Vec3),
    /// Value the joint would take for this ray, already clamped.
    Candidate(f32),
}

/// What a frame did to the session and the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Skipped,
    Anchored,
    /// Candidate within the epsilon of the last applied value.
    Unchanged(f32),
    Applied(f32),
    /// The grabbed joint no longer exists in the tree.
    Stale,
}

/// State held between grab and release of one joint.
#[derive(Debug, Clone)]
pub struct ManipulationSession {
    handle: JointHandle,
    kind: JointKind,
    axis: Option<Vec3>,
    grab_value: f32,
    reference: Option<Vec3>,
    last_applied: f32,
    manipulating: bool,
}

impl ManipulationSession {
    /// Opens a session on `handle`. `None` when the handle is stale or the
    /// joint is fixed.
    pub fn begin(tree: &KinematicTree, handle: JointHandle) -> Option<Self> {
        if !handle.is_valid_in(tree) {
            return None;
        }
        let joint = tree.joint(handle.joint)?;
        Some(Self {
            handle,
            kind: joint.kind(),
            axis: None,
            grab_value: joint.value(),
            reference: None,
            last_applied: joint.value(),
            manipulating: false,
        })
    }

    pub fn handle(&self) -> JointHandle {
        self.handle
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    pub fn grab_value(&self) -> f32 {
        self.grab_value
    }

    pub fn reference_point(&self) -> Option<Vec3> {
        self.reference
    }

    pub fn last_applied(&self) -> f32 {
        self.last_applied
    }

    pub fn cached_axis(&self) -> Option<Vec3> {
        self.axis
    }

    /// True once a value has actually been applied during this session.
    pub fn is_manipulating(&self) -> bool {
        self.manipulating
    }

    /// Pure evaluation of `ray` against the session: no state is touched, so
    /// the same ray always yields the same step.
    pub fn evaluate(&self, tree: &KinematicTree, ray: &Ray, axis: Vec3, config: &ManipulationConfig) -> DragStep {
        let (Some(joint), Some(frame)) = (
            tree.joint(self.handle.joint),
            tree.joint_world_transform(self.handle.joint),
        ) else {
            return DragStep::Skipped;
        };
        let pivot = frame.position;

        match self.kind {
            JointKind::Revolute | JointKind::Continuous => {
                let Some(point) = DragSolver::rotation_point(ray, pivot, axis, config.parallel_epsilon) else {
                    log::trace!("{}: ray parallel to rotation plane or behind origin", joint.name());
                    return DragStep::Skipped;
                };
                let Some(reference) = self.reference else {
                    return DragStep::Anchored(point);
                };
                match DragSolver::signed_angle(pivot, axis, reference, point, config.degenerate_epsilon) {
                    Some(angle) => DragStep::Candidate(joint.clamp_value(self.grab_value + angle)),
                    None => {
                        log::trace!("{}: pointer too close to rotation axis", joint.name());
                        DragStep::Skipped
                    }
                }
            }
            JointKind::Prismatic => {
                let Some(point) = DragSolver::translation_point(ray, pivot) else {
                    return DragStep::Skipped;
                };
                let Some(reference) = self.reference else {
                    return DragStep::Anchored(point);
                };
                let offset =
                    DragSolver::axial_offset(axis, reference, point, config.prismatic_sensitivity);
                DragStep::Candidate(joint.clamp_value(self.grab_value + offset))
            }
            JointKind::Fixed => DragStep::Skipped,
        }
    }

    /// Advances the session with a new pointer ray, writing to the tree when
    /// the candidate moves past `config.value_epsilon`.
    pub fn update(&mut self, tree: &mut KinematicTree, ray: &Ray, config: &ManipulationConfig) -> DragOutcome {
        if !self.handle.is_valid_in(tree) {
            return DragOutcome::Stale;
        }

        let axis = match self.axis {
            Some(axis) => axis,
            None => match resolve_world_axis(tree, self.handle.joint) {
                Some(axis) => *self.axis.insert(axis),
                None => return DragOutcome::Stale,
            },
        };

        match self.evaluate(tree, ray, axis, config) {
            DragStep::Skipped => DragOutcome::Skipped,
            DragStep::Anchored(point) => {
                self.reference = Some(point);
                if let Some(joint) = tree.joint(self.handle.joint) {
                    self.grab_value = joint.value();
                    self.last_applied = joint.value();
                    log::debug!("{}: anchored drag at {:?}", joint.name(), point);
                }
                DragOutcome::Anchored
            }
            DragStep::Candidate(value) => {
                if (value - self.last_applied).abs() <= config.value_epsilon {
                    log::trace!("candidate {} within epsilon of {}", value, self.last_applied);
                    return DragOutcome::Unchanged(value);
                }
                if !tree.set_joint_value(self.handle.joint, value) {
                    return DragOutcome::Skipped;
                }
                self.last_applied = value;
                self.manipulating = true;
                DragOutcome::Applied(value)
            }
        }
    }
}
