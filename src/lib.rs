//! # joint-drag
//!
//! Direct manipulation of articulated models: a pointer ray in, joint values
//! out. Hover a link, press, drag, and the joint that owns the link follows
//! the pointer.
//!
//! ## Features
//! - Kinematic tree with revolute, continuous, prismatic and fixed joints
//! - Ray picking against sphere, box and cylinder surfaces attached to links
//! - Sign-correct rotation tracking and axis-projected translation
//! - Idle / hovering / grabbed state machine with observer-style events
//! - External position feed gating and servo calibration helpers
//! - Timed recording and playback of joint motion
//!
//! ## Example
//! ```rust,ignore
//! use joint_drag::kinematics::{JointSpec, KinematicTree};
//! use joint_drag::manipulation::{Manipulator, ManipulationEvent};
//! use joint_drag::picking::{Ray, SphereShape};
//! use glam::Vec3;
//!
//! let mut tree = KinematicTree::builder("base")
//!     .link("arm")
//!     .joint(JointSpec::revolute("shoulder", "base", "arm").axis(Vec3::Y).limits(-1.5, 1.5))
//!     .surface("arm", SphereShape::new(Vec3::ZERO, 0.5))
//!     .build()?;
//!
//! let mut manipulator = Manipulator::default();
//! let mut events: Vec<ManipulationEvent> = Vec::new();
//!
//! manipulator.pointer_move(&mut tree, Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y), &mut events);
//! manipulator.pointer_down(&tree, &mut events);
//! manipulator.pointer_move(&mut tree, Ray::new(Vec3::new(1.0, 5.0, 0.0), Vec3::NEG_Y), &mut events);
//! manipulator.pointer_move(&mut tree, Ray::new(Vec3::new(0.0, 5.0, 1.0), Vec3::NEG_Y), &mut events);
//! manipulator.pointer_up(&tree, &mut events);
//! ```

pub mod calibration;
pub mod camera;
pub mod feed;
pub mod kinematics;
pub mod manipulation;
pub mod math;
pub mod picking;
pub mod recording;

pub use calibration::{CalibrationError, CalibrationPoint, CalibrationTable, ServoCalibration};
pub use camera::{Camera, OrbitController};
pub use feed::{FeedOutcome, PositionFeed};
pub use kinematics::{
    Joint, JointId, JointKind, JointLimits, JointSpec, KinematicTree, LinkId, TreeBuilder,
    TreeError, TreeId,
};
pub use manipulation::{
    DragOutcome, EventDispatcher, EventSink, InteractionState, JointHandle, ManipulationConfig,
    ManipulationEvent, ManipulationSession, Manipulator, PointerInput,
};
pub use math::Transform;
pub use picking::{BoxShape, CylinderShape, HitTester, Ray, RayHit, Shape, SphereShape};
pub use recording::{Playback, RecordSample, Recorder, Recording, RecordingError};
