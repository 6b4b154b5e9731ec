// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::frame::reflect;
use crate::math::spectrum::RGBSpectrum;

/// Perfect specular reflector.
pub struct Mirror {
    reflectance: RGBSpectrum,
}

impl Mirror {
    pub fn new(reflectance: RGBSpectrum) -> Self {
        Self { reflectance }
    }
}

impl BSDF for Mirror {
    fn f(&self, _its: &SurfaceIntersection<'_>, _wi: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn sample(&self, its: &SurfaceIntersection<'_>, _rng: &mut LcgRng) -> BSDFSampleRecord {
        let n = its.facing_sh_normal();
        let wi = reflect(&its.wo(), &n);
        let cos = wi.dot(&n).abs();
        if cos <= 0.0 {
            return BSDFSampleRecord::default();
        }
        BSDFSampleRecord { wi, pdf: 1.0, throughput: self.reflectance / cos }
    }

    fn pdf(&self, _its: &SurfaceIntersection<'_>, _wi: &Vector3f) -> Float {
        0.0
    }

    fn is_delta(&self) -> bool {
        true
    }
}
