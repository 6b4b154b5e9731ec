// Copyright @yucwang 2023

use crate::core::scene::ObjectId;
use crate::materials::Material;
use crate::math::constants::{ EPSILON, SHADOW_EPSILON, Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Hit record borrowed from the scene. Lives for one estimator call; a miss
/// is represented by the absence of a record.
#[derive(Clone)]
pub struct SurfaceIntersection<'a> {
    t: Float,
    p: Vector3f,
    geo_normal: Vector3f,
    sh_normal: Vector3f,
    wo: Vector3f,
    le: RGBSpectrum,
    object: ObjectId,
    material: &'a Material,
}

impl<'a> SurfaceIntersection<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(t: Float,
               p: Vector3f,
               geo_normal: Vector3f,
               sh_normal: Vector3f,
               wo: Vector3f,
               le: RGBSpectrum,
               object: ObjectId,
               material: &'a Material) -> Self {
        Self { t, p, geo_normal, sh_normal, wo, le, object, material }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    /// Outward geometric normal as reported by the shape.
    pub fn geo_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_normal
    }

    /// Unit direction from the hit back toward the ray origin.
    pub fn wo(&self) -> Vector3f {
        self.wo
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn material(&self) -> &'a Material {
        self.material
    }

    pub fn le(&self) -> RGBSpectrum {
        self.le
    }

    pub fn is_emitter(&self) -> bool {
        !self.le.is_black()
    }

    /// Radiance leaving the surface toward `w`; emitters are one-sided.
    pub fn emitted_toward(&self, w: &Vector3f) -> RGBSpectrum {
        if self.geo_normal.dot(w) > 0.0 {
            self.le
        } else {
            RGBSpectrum::default()
        }
    }

    /// Geometric normal flipped onto the side `wo` lies on.
    pub fn facing_normal(&self) -> Vector3f {
        if self.geo_normal.dot(&self.wo) < 0.0 { -self.geo_normal } else { self.geo_normal }
    }

    /// Shading normal flipped onto the side `wo` lies on.
    pub fn facing_sh_normal(&self) -> Vector3f {
        if self.geo_normal.dot(&self.wo) < 0.0 { -self.sh_normal } else { self.sh_normal }
    }

    pub fn spawn_ray(&self, dir: &Vector3f) -> Ray3f {
        Ray3f::new(self.offset_origin(dir), *dir, Some(0.0), None)
    }

    /// Shadow ray toward `target`; returns the ray and the unclipped distance.
    pub fn spawn_ray_to(&self, target: &Vector3f) -> (Ray3f, Float) {
        let to_target = target - self.p;
        let dist = to_target.norm();
        let dir = to_target / dist;
        let ray = Ray3f::new(self.offset_origin(&dir), dir, Some(0.0), Some((dist - SHADOW_EPSILON).max(0.0)));
        (ray, dist)
    }

    fn offset_origin(&self, dir: &Vector3f) -> Vector3f {
        let offset = if self.geo_normal.dot(dir) >= 0.0 { self.geo_normal } else { -self.geo_normal };
        self.p + offset * EPSILON
    }
}
