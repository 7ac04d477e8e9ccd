//! External position feed
//!
//! Values streamed from a live controller must not fight the pointer: while
//! a joint is grabbed, feed updates for that joint are dropped. Other joints
//! keep following the feed. Small changes inside a deadband are ignored so
//! sensor noise does not churn the model.

use crate::kinematics::KinematicTree;
use crate::manipulation::Manipulator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedOutcome {
    /// Written to the tree; carries the value after clamping.
    Applied(f32),
    /// The joint is being dragged.
    Suppressed,
    /// Within the deadband of the current value.
    BelowDeadband,
    /// No joint with that name.
    Unknown,
    /// The tree refused the value (fixed joint or non-finite value).
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFeed {
    pub deadband: f32,
}

impl Default for PositionFeed {
    fn default() -> Self {
        Self {
            deadband: 0.5_f32.to_radians(),
        }
    }
}

impl PositionFeed {
    pub fn new(deadband: f32) -> Self {
        Self {
            deadband: deadband.max(0.0),
        }
    }

    pub fn apply(
        &self,
        tree: &mut KinematicTree,
        manipulator: &Manipulator,
        name: &str,
        value: f32,
    ) -> FeedOutcome {
        let Some(id) = tree.joint_by_name(name) else {
            log::warn!("position feed names unknown joint `{}`", name);
            return FeedOutcome::Unknown;
        };

        if manipulator
            .grabbed()
            .is_some_and(|handle| handle.tree == tree.id() && handle.joint == id)
        {
            return FeedOutcome::Suppressed;
        }

        let current = tree.joint(id).map(|joint| joint.value()).unwrap_or_default();
        if (value - current).abs() <= self.deadband {
            return FeedOutcome::BelowDeadband;
        }

        if !tree.set_joint_value(id, value) {
            return FeedOutcome::Rejected;
        }
        FeedOutcome::Applied(tree.joint(id).map(|joint| joint.value()).unwrap_or(value))
    }

    /// Applies a batch and returns the names of joints that actually moved.
    pub fn apply_all<'a, I>(&self, tree: &mut KinematicTree, manipulator: &Manipulator, values: I) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        values
            .into_iter()
            .filter_map(|(name, value)| match self.apply(tree, manipulator, name, value) {
                FeedOutcome::Applied(_) => Some(name.to_string()),
                _ => None,
            })
            .collect()
    }
}
