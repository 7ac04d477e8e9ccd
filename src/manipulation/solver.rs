use glam::Vec3;

use crate::picking::Ray;

/// Geometry behind a drag: where the pointer ray meets the joint's motion
/// plane or line, and how far the joint moved between two such points.
pub struct DragSolver;

impl DragSolver {
    /// Intersection of `ray` with the plane through `pivot` normal to `axis`.
    pub fn rotation_point(ray: &Ray, pivot: Vec3, axis: Vec3, parallel_epsilon: f32) -> Option<Vec3> {
        ray.intersect_plane(pivot, axis, parallel_epsilon)
    }

    /// Point on the ray's line closest to `pivot`.
    pub fn translation_point(ray: &Ray, pivot: Vec3) -> Option<Vec3> {
        ray.closest_point_to(pivot).filter(|p| p.is_finite())
    }

    /// Signed angle from `from` to `to` around `axis`, both measured from
    /// `pivot` and projected onto the rotation plane. Positive is a
    /// right-handed turn about `axis`.
    ///
    /// `None` when either projection is shorter than `degenerate_epsilon`,
    /// i.e. the pointer is too close to the rotation axis.
    pub fn signed_angle(
        pivot: Vec3,
        axis: Vec3,
        from: Vec3,
        to: Vec3,
        degenerate_epsilon: f32,
    ) -> Option<f32> {
        let v1 = Self::project_onto_plane(from - pivot, axis);
        let v2 = Self::project_onto_plane(to - pivot, axis);

        if !(v1.length() >= degenerate_epsilon) || !(v2.length() >= degenerate_epsilon) {
            return None;
        }
        let (v1, v2) = (v1.normalize(), v2.normalize());

        // Clamped: rounding can push the dot product of unit vectors past 1.
        let angle = v1.dot(v2).clamp(-1.0, 1.0).acos();

        if v1.cross(v2).dot(axis) < 0.0 {
            Some(-angle)
        } else {
            Some(angle)
        }
    }

    /// Displacement from `from` to `to` measured along `axis`, scaled.
    pub fn axial_offset(axis: Vec3, from: Vec3, to: Vec3, sensitivity: f32) -> f32 {
        (to - from).dot(axis) * sensitivity
    }

    fn project_onto_plane(v: Vec3, normal: Vec3) -> Vec3 {
        v - normal * v.dot(normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn quarter_turn_about_y_is_negative() {
        let angle =
            DragSolver::signed_angle(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::Z, 1e-3).unwrap();
        assert_abs_diff_eq!(angle, -FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn reversed_drag_flips_sign() {
        let angle =
            DragSolver::signed_angle(Vec3::ZERO, Vec3::Y, Vec3::Z, Vec3::X, 1e-3).unwrap();
        assert_abs_diff_eq!(angle, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn out_of_plane_components_are_ignored() {
        let pivot = Vec3::new(1.0, 2.0, 3.0);
        let angle = DragSolver::signed_angle(
            pivot,
            Vec3::Z,
            pivot + Vec3::new(1.0, 0.0, 5.0),
            pivot + Vec3::new(0.0, 2.0, -7.0),
            1e-3,
        )
        .unwrap();
        assert_abs_diff_eq!(angle, FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn opposite_points_do_not_produce_nan() {
        let angle = DragSolver::signed_angle(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::new(1.0, 0.0, 1e-7),
            Vec3::new(-1.0, 0.0, 0.0),
            1e-3,
        )
        .unwrap();
        assert!(angle.is_finite());
        assert_abs_diff_eq!(angle.abs(), PI, epsilon = 1e-4);
    }

    #[test]
    fn point_on_axis_is_degenerate() {
        let from = Vec3::new(0.0, 3.0, 0.0);
        assert!(DragSolver::signed_angle(Vec3::ZERO, Vec3::Y, from, Vec3::X, 1e-3).is_none());
        assert!(DragSolver::signed_angle(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::new(0.0, 0.0, 5e-4), 1e-3)
            .is_none());
    }

    #[test]
    fn axial_offset_scales_projection() {
        let offset = DragSolver::axial_offset(Vec3::X, Vec3::ZERO, Vec3::new(2.0, 5.0, 0.0), 0.01);
        assert_abs_diff_eq!(offset, 0.02, epsilon = 1e-7);
    }

    #[test]
    fn translation_point_uses_line_projection() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let p = DragSolver::translation_point(&ray, Vec3::new(0.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-6);
    }
}
