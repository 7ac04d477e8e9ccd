//! Direct manipulation
//!
//! Turns a stream of pointer rays into joint values. Each frame the host
//! passes the current world-space ray to a [`Manipulator`]; while nothing is
//! grabbed the ray only decides what is hovered, while a joint is grabbed
//! the ray drives that joint's value:
//!
//! - revolute/continuous joints: the ray meets the plane through the pivot
//!   normal to the world axis, and the signed angle between the first and
//!   current intersection is added to the value at grab time;
//! - prismatic joints: the point on the ray closest to the pivot is tracked
//!   and its displacement along the axis, times a sensitivity, is added.
//!
//! Geometrically useless frames are dropped silently. Changes smaller than
//! [`ManipulationConfig::value_epsilon`] are never applied.

pub mod axis;
pub mod config;
pub mod events;
pub mod session;
pub mod solver;
pub mod state;

pub use axis::resolve_world_axis;
pub use config::ManipulationConfig;
pub use events::{EventDispatcher, EventSink, JointHandle, ManipulationEvent, NullSink};
pub use session::{DragOutcome, DragStep, ManipulationSession};
pub use solver::DragSolver;
pub use state::{InteractionState, Manipulator, PointerInput};
