// Copyright @yucwang 2026

use crate::core::shape::{ Shape, ShapeHit, SurfaceSample };
use crate::math::constants::{ PI, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    /// Nearest root of the ray/sphere quadratic inside the ray's range.
    fn hit_t(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let half_b = oc.dot(&ray.dir());
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let t0 = -half_b - sqrt_d;
        let t1 = -half_b + sqrt_d;
        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }
}

impl Shape for Sphere {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.hit_t(ray)?;
        let p = ray.at(t);
        let n = (p - self.center) / self.radius;
        Some(ShapeHit { t, p, geo_normal: n, sh_normal: n })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_t(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSample {
        let n = sample_uniform_sphere(u);
        SurfaceSample {
            point: self.center + n * self.radius,
            normal: n,
            inv_pdf: self.surface_area(),
        }
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_from_outside_and_inside() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("hit");
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.geo_normal - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);

        let inside = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inside).expect("hit");
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.geo_normal - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_sphere_respects_max_t() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, Some(3.0));
        assert!(!sphere.ray_intersection_t(&ray));
    }

    #[test]
    fn test_sphere_sample_on_surface() {
        let sphere = Sphere::new(Vector3f::new(1.0, 2.0, 3.0), 2.0);
        let s = sphere.sample(&Vector2f::new(0.3, 0.7));
        assert!(((s.point - sphere.center()).norm() - 2.0).abs() < 1e-5);
        assert!((s.inv_pdf - 16.0 * PI).abs() < 1e-3);
    }
}
