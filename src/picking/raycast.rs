use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            t_min: 0.0001,
            t_max: f32::MAX,
        }
    }

    pub fn with_range(origin: Vec3, direction: Vec3, t_min: f32, t_max: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            t_min,
            t_max,
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Maps the ray through `matrix` without renormalizing, so a parameter
    /// `t` names the same physical point before and after.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
            t_min: self.t_min,
            t_max: self.t_max,
        }
    }

    /// Intersects the ray with the plane through `point` with unit `normal`.
    ///
    /// Returns `None` when the ray is within `parallel_epsilon` of lying in
    /// the plane (`|direction·normal| <= parallel_epsilon`), when the
    /// intersection is at or behind the origin, or when it is not finite.
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3, parallel_epsilon: f32) -> Option<Vec3> {
        let denom = self.direction.dot(normal);
        // Negated form so a NaN denominator is rejected too.
        if !(denom.abs() > parallel_epsilon) {
            return None;
        }

        let t = (point - self.origin).dot(normal) / denom;
        if !(t > 0.0) {
            return None;
        }

        Some(self.at(t)).filter(|p| p.is_finite())
    }

    /// Point on the ray's supporting line closest to `point`. `None` for a
    /// ray with no direction.
    pub fn closest_point_to(&self, point: Vec3) -> Option<Vec3> {
        let len_sq = self.direction.length_squared();
        if len_sq < 1e-12 {
            return None;
        }
        let t = (point - self.origin).dot(self.direction) / len_sq;
        Some(self.at(t))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
}
