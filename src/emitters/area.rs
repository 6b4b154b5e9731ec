// Copyright @yucwang 2026

use crate::core::emitter::{ Emitter, EmitterSample, LightSample, Measure };
use crate::core::scene::{ ObjectId, Scene };
use crate::core::shape::SurfaceSample;
use crate::math::constants::{ Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Emitter attached to a scene object; the geometry is looked up through
/// the object handle.
pub struct AreaLight {
    object: ObjectId,
    radiance: RGBSpectrum,
}

impl AreaLight {
    pub fn new(object: ObjectId, radiance: RGBSpectrum) -> Self {
        Self { object, radiance }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }
}

impl Emitter for AreaLight {
    fn name(&self) -> &'static str {
        "area"
    }

    fn sample(&self, scene: &Scene, _reference: &Vector3f, u: &Vector2f) -> Option<EmitterSample> {
        let sample = scene.object(self.object).shape().sample(u);
        if sample.inv_pdf <= 0.0 {
            return None;
        }
        Some(EmitterSample {
            point: sample.point,
            normal: sample.normal,
            inv_pdf: sample.inv_pdf,
            measure: Measure::Area,
        })
    }

    fn emit(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum {
        if sample.faces(reference) {
            self.radiance
        } else {
            RGBSpectrum::default()
        }
    }

    fn biradiance(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum {
        let to_reference = reference - sample.point;
        let dist2 = to_reference.norm_squared();
        if dist2 <= 0.0 {
            return RGBSpectrum::default();
        }
        let cos_light = sample.normal.dot(&to_reference) / dist2.sqrt();
        if cos_light <= 0.0 {
            return RGBSpectrum::default();
        }
        self.radiance * (cos_light / dist2)
    }

    fn sample_emission(&self, scene: &Scene, u: &Vector2f) -> Option<SurfaceSample> {
        let sample = scene.object(self.object).shape().sample(u);
        if sample.inv_pdf > 0.0 { Some(sample) } else { None }
    }

    fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }
}
