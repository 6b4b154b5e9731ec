// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ INV_PI, INV_TWO_PI, Float, Vector3f };
use crate::math::frame::{ reflect, Frame };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_uniform_hemisphere, sample_uniform_hemisphere_pdf };

/// Modified Phong: diffuse lobe plus a normalized specular lobe around the
/// mirror direction.
pub struct Phong {
    kd: RGBSpectrum,
    ks: RGBSpectrum,
    exponent: Float,
}

impl Phong {
    pub fn new(kd: RGBSpectrum, ks: RGBSpectrum, exponent: Float) -> Self {
        Self { kd, ks, exponent }
    }
}

impl BSDF for Phong {
    fn f(&self, its: &SurfaceIntersection<'_>, wi: &Vector3f) -> RGBSpectrum {
        let n = its.facing_sh_normal();
        if wi.dot(&n) <= 0.0 {
            return RGBSpectrum::default();
        }
        let cos_alpha = wi.dot(&reflect(&its.wo(), &n)).max(0.0);
        let specular = (self.exponent + 2.0) * INV_TWO_PI * cos_alpha.powf(self.exponent);
        self.kd * INV_PI + self.ks * specular
    }

    fn sample(&self, its: &SurfaceIntersection<'_>, rng: &mut LcgRng) -> BSDFSampleRecord {
        let frame = Frame::from_normal(&its.facing_sh_normal());
        let wi = frame.to_world(&sample_uniform_hemisphere(&rng.next_2d()));
        BSDFSampleRecord {
            wi,
            pdf: sample_uniform_hemisphere_pdf(),
            throughput: self.f(its, &wi),
        }
    }

    fn pdf(&self, its: &SurfaceIntersection<'_>, wi: &Vector3f) -> Float {
        if wi.dot(&its.facing_sh_normal()) <= 0.0 {
            0.0
        } else {
            sample_uniform_hemisphere_pdf()
        }
    }
}
