// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::frame::reflect;
use crate::math::spectrum::RGBSpectrum;

pub const DEFAULT_GLASS_IOR: Float = 1.5;

/// Smooth dielectric interface with vacuum outside. Reflection and
/// refraction are chosen in proportion to the Fresnel term.
pub struct Glass {
    ior: Float,
}

impl Glass {
    pub fn new(ior: Float) -> Self {
        Self { ior }
    }

    pub fn ior(&self) -> Float {
        self.ior
    }
}

impl Default for Glass {
    fn default() -> Self {
        Self::new(DEFAULT_GLASS_IOR)
    }
}

/// Unpolarized Fresnel reflectance; `cos_i` is measured against the
/// outward normal, negative when arriving from inside.
pub fn fresnel_dielectric(cos_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let cos_i = cos_i.max(-1.0).min(1.0);
    let (eta_i, eta_t) = if cos_i > 0.0 { (eta_i, eta_t) } else { (eta_t, eta_i) };
    let cos_i = cos_i.abs();

    let sin2_t = (eta_i / eta_t).powi(2) * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    let r_parl = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

/// Refract `wo` through the interface with normal `n` on the side of `wo`.
/// `eta` is the ratio of incident over transmitted indices.
pub fn refract(wo: &Vector3f, n: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_i = wo.dot(n).max(-1.0).min(1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(-eta * wo + (eta * cos_i - cos_t) * n)
}

impl BSDF for Glass {
    fn f(&self, _its: &SurfaceIntersection<'_>, _wi: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn sample(&self, its: &SurfaceIntersection<'_>, rng: &mut LcgRng) -> BSDFSampleRecord {
        let wo = its.wo();
        let n = its.sh_normal();
        let cos_o = wo.dot(&n);
        let fresnel = fresnel_dielectric(cos_o, 1.0, self.ior);

        let facing = if cos_o >= 0.0 { n } else { -n };
        let refracted = if rng.next_f32() < fresnel {
            None
        } else {
            let eta = if cos_o >= 0.0 { 1.0 / self.ior } else { self.ior };
            refract(&wo, &facing, eta).map(|wt| wt.normalize())
        };

        let (wi, pdf) = match refracted {
            Some(wt) => (wt, 1.0 - fresnel),
            None => (reflect(&wo, &facing), fresnel),
        };
        let cos = wi.dot(&n).abs();
        if cos <= 0.0 || pdf <= 0.0 {
            return BSDFSampleRecord::default();
        }
        BSDFSampleRecord { wi, pdf, throughput: RGBSpectrum::splat(pdf / cos) }
    }

    fn pdf(&self, _its: &SurfaceIntersection<'_>, _wi: &Vector3f) -> Float {
        0.0
    }

    fn is_delta(&self) -> bool {
        true
    }
}
