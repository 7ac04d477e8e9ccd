//! Math utilities module
//!
//! Provides convenient re-exports from glam and the rigid transform used for
//! link and joint poses.

mod transform;

pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3};
