// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;

/// Raw geometric hit reported by a shape; the scene attaches material data.
#[derive(Debug, Copy, Clone)]
pub struct ShapeHit {
    pub t: Float,
    pub p: Vector3f,
    pub geo_normal: Vector3f,
    pub sh_normal: Vector3f,
}

/// Point drawn on a surface. `inv_pdf` is with respect to area.
#[derive(Debug, Copy, Clone)]
pub struct SurfaceSample {
    pub point: Vector3f,
    pub normal: Vector3f,
    pub inv_pdf: Float,
}

pub trait Shape: Send + Sync {
    fn name(&self) -> &'static str;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit>;
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }
    fn sample(&self, u: &Vector2f) -> SurfaceSample;
    fn surface_area(&self) -> Float;
}
