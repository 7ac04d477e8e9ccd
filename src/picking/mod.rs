mod hit;
mod raycast;
mod shape;

pub use hit::{HitTester, PickResult};
pub use raycast::{Ray, RayHit};
pub use shape::{BoxShape, CylinderShape, Shape, SphereShape};
