// Copyright @yucwang 2026

use crate::core::scene::Scene;
use crate::core::shape::SurfaceSample;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Space in which a light sample's density is expressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Measure {
    Area,
    SolidAngle,
}

/// Point drawn by an emitter, before light selection is folded in.
#[derive(Debug, Copy, Clone)]
pub struct EmitterSample {
    pub point: Vector3f,
    pub normal: Vector3f,
    pub inv_pdf: Float,
    pub measure: Measure,
}

/// Light sample as seen by the estimators. `inv_pdf` includes the light
/// selection probability and lives in `measure`.
#[derive(Debug, Copy, Clone)]
pub struct LightSample {
    pub light: usize,
    pub point: Vector3f,
    pub normal: Vector3f,
    pub inv_pdf: Float,
    pub measure: Measure,
}

impl LightSample {
    /// Density of this sample with respect to solid angle at `reference`.
    pub fn solid_angle_pdf(&self, reference: &Vector3f) -> Float {
        if self.inv_pdf <= 0.0 {
            return 0.0;
        }
        let pdf = 1.0 / self.inv_pdf;
        match self.measure {
            Measure::SolidAngle => pdf,
            Measure::Area => {
                let to_light = self.point - reference;
                let dist2 = to_light.norm_squared();
                if dist2 <= 0.0 {
                    return 0.0;
                }
                let cos_light = self.normal.dot(&(to_light / dist2.sqrt())).abs();
                if cos_light <= 0.0 {
                    return 0.0;
                }
                pdf * dist2 / cos_light
            }
        }
    }

    /// Whether the light surface faces `reference`.
    pub fn faces(&self, reference: &Vector3f) -> bool {
        self.normal.dot(&(reference - self.point)) > 0.0
    }
}

pub trait Emitter: Send + Sync {
    fn name(&self) -> &'static str;

    fn sample(&self, scene: &Scene, reference: &Vector3f, u: &Vector2f) -> Option<EmitterSample>;

    /// Radiance leaving the sampled point toward `reference`.
    fn emit(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum;

    /// Emitted radiance times the geometric coupling to `reference`
    /// (`cos_light / d^2` for area samples, unity for directions).
    fn biradiance(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum;

    /// Start point of a photon path, or `None` for lights that do not emit photons.
    fn sample_emission(&self, _scene: &Scene, _u: &Vector2f) -> Option<SurfaceSample> {
        None
    }

    fn radiance(&self) -> RGBSpectrum;

    fn is_environment(&self) -> bool {
        false
    }
}
