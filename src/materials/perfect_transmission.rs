// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Index-matched boundary: light continues along its direction. Used to
/// delimit participating media.
#[derive(Default)]
pub struct PerfectTransmission;

impl PerfectTransmission {
    pub fn new() -> Self {
        Self
    }
}

impl BSDF for PerfectTransmission {
    fn f(&self, _its: &SurfaceIntersection<'_>, _wi: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn sample(&self, its: &SurfaceIntersection<'_>, _rng: &mut LcgRng) -> BSDFSampleRecord {
        let wi = -its.wo();
        let cos = wi.dot(&its.sh_normal()).abs();
        if cos <= 0.0 {
            return BSDFSampleRecord::default();
        }
        BSDFSampleRecord { wi, pdf: 1.0, throughput: RGBSpectrum::ones() / cos }
    }

    fn pdf(&self, _its: &SurfaceIntersection<'_>, _wi: &Vector3f) -> Float {
        0.0
    }

    fn is_delta(&self) -> bool {
        true
    }
}
