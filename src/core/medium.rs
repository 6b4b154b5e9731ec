// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::media::phase::HenyeyGreenstein;
use crate::math::constants::Vector3f;
use crate::math::spectrum::RGBSpectrum;

/// Outcome of asking a medium to scatter along a segment.
#[derive(Debug, Copy, Clone)]
pub struct IntegrationResult {
    pub should_scatter: bool,
    /// Path-throughput factor for the sampled event (scatter or pass-through).
    pub weight: RGBSpectrum,
    /// In-scattered next-event radiance, already resolved at `scatter_point`.
    pub ld: RGBSpectrum,
    pub scatter_point: Vector3f,
}

impl IntegrationResult {
    pub fn no_scatter() -> Self {
        Self::pass_through(RGBSpectrum::ones())
    }

    pub fn pass_through(weight: RGBSpectrum) -> Self {
        Self {
            should_scatter: false,
            weight,
            ld: RGBSpectrum::default(),
            scatter_point: Vector3f::zeros(),
        }
    }

    pub fn scatter(weight: RGBSpectrum, ld: RGBSpectrum, scatter_point: Vector3f) -> Self {
        Self { should_scatter: true, weight, ld, scatter_point }
    }
}

pub trait Medium: Send + Sync {
    fn transmittance(&self, a: &Vector3f, b: &Vector3f) -> RGBSpectrum;

    /// Sample an in-scattering event on the segment `a -> b`.
    fn integrate(&self, a: &Vector3f, b: &Vector3f, scene: &Scene, rng: &mut LcgRng) -> IntegrationResult;

    fn phase(&self) -> HenyeyGreenstein {
        HenyeyGreenstein::isotropic()
    }
}
