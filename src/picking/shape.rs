use glam::Vec3;
use std::fmt::Debug;

use super::raycast::{Ray, RayHit};

/// Pickable geometry in link-local coordinates.
pub trait Shape: Send + Sync + Debug {
    fn ray_intersect(&self, ray: &Ray) -> Option<RayHit>;
    fn clone_box(&self) -> Box<dyn Shape>;
}

impl Clone for Box<dyn Shape> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SphereShape {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereShape {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    fn surface_normal(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }
}

impl Shape for SphereShape {
    fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        if a < 1e-12 {
            return None;
        }
        let b = 2.0 * oc.dot(ray.direction);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        for t in [(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)] {
            if t > ray.t_min && t < ray.t_max {
                let point = ray.at(t);
                let normal = self.surface_normal(point);
                return Some(RayHit { t, point, normal });
            }
        }

        None
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(*self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoxShape {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoxShape {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// URDF `<box size=..>`: full edge lengths centred on the origin.
    pub fn from_size(size: Vec3) -> Self {
        Self::from_center_half_extents(Vec3::ZERO, size * 0.5)
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    fn surface_normal(&self, point: Vec3) -> Vec3 {
        let p = (point - self.center()) / self.half_extents().max(Vec3::splat(0.0001));

        let abs_p = p.abs();
        if abs_p.x > abs_p.y && abs_p.x > abs_p.z {
            Vec3::X * p.x.signum()
        } else if abs_p.y > abs_p.z {
            Vec3::Y * p.y.signum()
        } else {
            Vec3::Z * p.z.signum()
        }
    }
}

impl Shape for BoxShape {
    fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < 1e-8 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let (t1, t2) = ((lo - origin) * inv, (hi - origin) * inv);
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_near > t_far || t_far < ray.t_min {
            return None;
        }

        let t = if t_near > ray.t_min { t_near } else { t_far };
        if t > ray.t_max {
            return None;
        }

        let point = ray.at(t);
        let normal = self.surface_normal(point);

        Some(RayHit { t, point, normal })
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(*self)
    }
}

/// Cylinder centred on the origin with its axis along local Z, as URDF
/// declares them.
#[derive(Debug, Clone, Copy)]
pub struct CylinderShape {
    pub radius: f32,
    pub length: f32,
}

impl CylinderShape {
    pub fn new(radius: f32, length: f32) -> Self {
        Self { radius, length }
    }

    fn side_hits(&self, ray: &Ray) -> [Option<f32>; 2] {
        let (ox, oy) = (ray.origin.x, ray.origin.y);
        let (dx, dy) = (ray.direction.x, ray.direction.y);
        let a = dx * dx + dy * dy;
        if a < 1e-12 {
            return [None, None];
        }
        let b = 2.0 * (ox * dx + oy * dy);
        let c = ox * ox + oy * oy - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return [None, None];
        }
        let sqrt_d = discriminant.sqrt();
        let half = self.length * 0.5;
        let within = |t: f32| (ray.at(t).z.abs() <= half).then_some(t);
        [
            within((-b - sqrt_d) / (2.0 * a)),
            within((-b + sqrt_d) / (2.0 * a)),
        ]
    }

    fn cap_hits(&self, ray: &Ray) -> [Option<f32>; 2] {
        let dz = ray.direction.z;
        if dz.abs() < 1e-8 {
            return [None, None];
        }
        let half = self.length * 0.5;
        let r_sq = self.radius * self.radius;
        let on_cap = |z: f32| {
            let t = (z - ray.origin.z) / dz;
            let p = ray.at(t);
            (p.x * p.x + p.y * p.y <= r_sq).then_some(t)
        };
        [on_cap(half), on_cap(-half)]
    }
}

impl Shape for CylinderShape {
    fn ray_intersect(&self, ray: &Ray) -> Option<RayHit> {
        let half = self.length * 0.5;
        let [s0, s1] = self.side_hits(ray);
        let [c0, c1] = self.cap_hits(ray);

        let t = [s0, s1, c0, c1]
            .into_iter()
            .flatten()
            .filter(|t| *t > ray.t_min && *t < ray.t_max)
            .min_by(|a, b| a.total_cmp(b))?;

        let point = ray.at(t);
        let normal = if (point.z.abs() - half).abs() < 1e-4 {
            Vec3::Z * point.z.signum()
        } else {
            Vec3::new(point.x, point.y, 0.0).normalize_or_zero()
        };

        Some(RayHit { t, point, normal })
    }

    fn clone_box(&self) -> Box<dyn Shape> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sphere_hit_from_outside_uses_near_side() {
        let sphere = SphereShape::new(Vec3::ZERO, 1.0);
        let hit = sphere
            .ray_intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z))
            .unwrap();
        assert_abs_diff_eq!(hit.t, 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(hit.normal.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn sphere_miss() {
        let sphere = SphereShape::new(Vec3::ZERO, 1.0);
        assert!(sphere
            .ray_intersect(&Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z))
            .is_none());
    }

    #[test]
    fn box_hit_and_axis_aligned_miss() {
        let b = BoxShape::from_size(Vec3::splat(2.0));
        let hit = b
            .ray_intersect(&Ray::new(Vec3::new(0.5, 0.5, 10.0), Vec3::NEG_Z))
            .unwrap();
        assert_abs_diff_eq!(hit.t, 9.0, epsilon = 1e-5);
        assert_eq!(hit.normal, Vec3::Z);

        // Direction has zero X and Y components; origin lies outside the X slab.
        assert!(b
            .ray_intersect(&Ray::new(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z))
            .is_none());
    }

    #[test]
    fn box_hit_from_inside_uses_far_side() {
        let b = BoxShape::from_size(Vec3::splat(2.0));
        let hit = b.ray_intersect(&Ray::new(Vec3::ZERO, Vec3::X)).unwrap();
        assert_abs_diff_eq!(hit.t, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn cylinder_side_and_cap() {
        let c = CylinderShape::new(0.5, 2.0);

        let side = c
            .ray_intersect(&Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_X))
            .unwrap();
        assert_abs_diff_eq!(side.t, 4.5, epsilon = 1e-5);
        assert_abs_diff_eq!(side.normal.x, 1.0, epsilon = 1e-5);

        let cap = c
            .ray_intersect(&Ray::new(Vec3::new(0.1, 0.0, 5.0), Vec3::NEG_Z))
            .unwrap();
        assert_abs_diff_eq!(cap.t, 4.0, epsilon = 1e-5);
        assert_eq!(cap.normal, Vec3::Z);
    }

    #[test]
    fn cylinder_misses_past_its_length() {
        let c = CylinderShape::new(0.5, 2.0);
        assert!(c
            .ray_intersect(&Ray::new(Vec3::new(5.0, 0.0, 1.5), Vec3::NEG_X))
            .is_none());
    }
}
