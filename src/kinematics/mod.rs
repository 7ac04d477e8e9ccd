//! Kinematic model
//!
//! Joints, links and the tree that owns them. The manipulation engine only
//! borrows from a [`KinematicTree`]; the tree itself is built once by a model
//! loader and replaced wholesale on reload.

pub mod joint;
pub mod tree;

pub use joint::{Joint, JointId, JointKind, JointLimits, LinkId};
pub use tree::{JointSpec, KinematicTree, Link, Surface, TreeBuilder, TreeError, TreeId};
