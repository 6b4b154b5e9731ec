// Copyright @yucwang 2026

use crate::core::shape::{ Shape, ShapeHit, SurfaceSample };
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;

/// Parallelogram `center ± u/2 ± v/2`, facing `u × v`.
pub struct Rectangle {
    center: Vector3f,
    u: Vector3f,
    v: Vector3f,
    normal: Vector3f,
    area: Float,
}

impl Rectangle {
    pub fn new(center: Vector3f, u: Vector3f, v: Vector3f) -> Self {
        let cross = u.cross(&v);
        let area = cross.norm();
        let normal = if area > 0.0 { cross / area } else { Vector3f::new(0.0, 0.0, 1.0) };
        Self { center, u, v, normal, area }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    fn hit_t(&self, ray: &Ray3f) -> Option<Float> {
        let n_dot_dir = self.normal.dot(&ray.dir());
        if n_dot_dir.abs() < EPSILON {
            return None;
        }
        let t = (self.center - ray.origin()).dot(&self.normal) / n_dot_dir;
        if !ray.test_segment(t) {
            return None;
        }
        let local = ray.at(t) - self.center;
        let a = local.dot(&self.u) / self.u.norm_squared();
        let b = local.dot(&self.v) / self.v.norm_squared();
        if a.abs() > 0.5 || b.abs() > 0.5 {
            return None;
        }
        Some(t)
    }
}

impl Shape for Rectangle {
    fn name(&self) -> &'static str {
        "rectangle"
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.hit_t(ray)?;
        Some(ShapeHit { t, p: ray.at(t), geo_normal: self.normal, sh_normal: self.normal })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_t(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSample {
        SurfaceSample {
            point: self.center + self.u * (u.x - 0.5) + self.v * (u.y - 0.5),
            normal: self.normal,
            inv_pdf: self.area,
        }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Rectangle {
        Rectangle::new(Vector3f::zeros(), Vector3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 4.0, 0.0))
    }

    #[test]
    fn test_rectangle_normal_and_area() {
        let rect = floor();
        assert!((rect.normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert!((rect.surface_area() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_bounds() {
        let rect = floor();
        let down = Vector3f::new(0.0, 0.0, -1.0);
        let inside = Ray3f::new(Vector3f::new(0.9, 1.9, 1.0), down, None, None);
        let outside = Ray3f::new(Vector3f::new(1.1, 0.0, 1.0), down, None, None);
        let hit = rect.ray_intersection(&inside).expect("hit");
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!(rect.ray_intersection(&outside).is_none());
    }

    #[test]
    fn test_rectangle_sample_stays_inside() {
        let rect = floor();
        for &(x, y) in &[(0.0, 0.0), (1.0, 1.0), (0.25, 0.75)] {
            let s = rect.sample(&Vector2f::new(x, y));
            assert!(s.point.x.abs() <= 1.0 + 1e-6);
            assert!(s.point.y.abs() <= 2.0 + 1e-6);
            assert!(s.point.z.abs() < 1e-6);
        }
    }
}
