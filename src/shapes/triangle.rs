// Copyright @yucwang 2023

use crate::core::shape::{ Shape, ShapeHit, SurfaceSample };
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_triangle;

pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f,
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        Self { p0, p1, p2 }
    }

    pub fn geometric_normal(&self) -> Vector3f {
        (self.p1 - self.p0).cross(&(self.p2 - self.p0)).normalize()
    }

    fn is_in_triangle(&self, p: &Vector3f) -> bool {
        let geo_normal = (self.p1 - self.p0).cross(&(self.p2 - self.p0));

        let n0 = (self.p1 - self.p0).cross(&(p - self.p0));
        let n1 = (self.p2 - self.p1).cross(&(p - self.p1));
        let n2 = (self.p0 - self.p2).cross(&(p - self.p2));

        n0.dot(&geo_normal) >= 0.0 && n1.dot(&geo_normal) >= 0.0 && n2.dot(&geo_normal) >= 0.0
    }

    fn hit_t(&self, ray: &Ray3f) -> Option<Float> {
        let geo_normal = self.geometric_normal();
        let n_dot_dir = geo_normal.dot(&ray.dir());
        if n_dot_dir.abs() < EPSILON {
            return None;
        }

        let t = (geo_normal.dot(&self.p0) - geo_normal.dot(&ray.origin())) / n_dot_dir;
        if !ray.test_segment(t) || !self.is_in_triangle(&ray.at(t)) {
            return None;
        }
        Some(t)
    }
}

impl Shape for Triangle {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.hit_t(ray)?;
        let n = self.geometric_normal();
        Some(ShapeHit { t, p: ray.at(t), geo_normal: n, sh_normal: n })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_t(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSample {
        let b = sample_uniform_triangle(u);
        SurfaceSample {
            point: self.p0 * b.x + self.p1 * b.y + self.p2 * b.z,
            normal: self.geometric_normal(),
            inv_pdf: self.surface_area(),
        }
    }

    fn surface_area(&self) -> Float {
        0.5 * (self.p1 - self.p0).cross(&(self.p2 - self.p0)).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                      Vector3f::new(2.0, 2.0, 0.0),
                      Vector3f::new(2.0, 1.0, 0.0))
    }

    #[test]
    fn test_is_in_triangle() {
        let triangle = unit_triangle();
        assert!(triangle.is_in_triangle(&Vector3f::new(1.5, 1.1, 0.0)));
        assert!(!triangle.is_in_triangle(&Vector3f::new(1.5, 2.0, 0.0)));
    }

    #[test]
    fn test_ray_intersection() {
        let triangle = unit_triangle();
        let ray = Ray3f::new(Vector3f::new(1.8, 1.2, 3.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = triangle.ray_intersection(&ray).expect("hit");
        assert!((hit.t - 3.0).abs() < 1e-5);

        let parallel = Ray3f::new(Vector3f::new(1.8, 1.2, 3.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(triangle.ray_intersection(&parallel).is_none());
    }

    #[test]
    fn test_sample_and_area() {
        let triangle = unit_triangle();
        assert!((triangle.surface_area() - 0.5).abs() < 1e-6);
        let s = triangle.sample(&Vector2f::new(0.4, 0.6));
        assert!(triangle.is_in_triangle(&s.point));
        assert!((s.inv_pdf - 0.5).abs() < 1e-6);
    }
}
