// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ INV_PI, Float, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Two-sided diffuse reflector.
pub struct Lambertian {
    albedo: RGBSpectrum,
}

impl Lambertian {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }
}

impl BSDF for Lambertian {
    fn f(&self, its: &SurfaceIntersection<'_>, wi: &Vector3f) -> RGBSpectrum {
        if wi.dot(&its.facing_sh_normal()) <= 0.0 {
            return RGBSpectrum::default();
        }
        self.albedo * INV_PI
    }

    fn sample(&self, its: &SurfaceIntersection<'_>, rng: &mut LcgRng) -> BSDFSampleRecord {
        let frame = Frame::from_normal(&its.facing_sh_normal());
        let local = sample_cosine_hemisphere(&rng.next_2d());
        let pdf = sample_cosine_hemisphere_pdf(local.z);
        if pdf <= 0.0 {
            return BSDFSampleRecord::default();
        }
        BSDFSampleRecord {
            wi: frame.to_world(&local),
            pdf,
            throughput: self.albedo * INV_PI,
        }
    }

    fn pdf(&self, its: &SurfaceIntersection<'_>, wi: &Vector3f) -> Float {
        sample_cosine_hemisphere_pdf(wi.dot(&its.facing_sh_normal()))
    }
}
