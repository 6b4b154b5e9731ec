// Copyright @yucwang 2026

pub mod area;
pub mod envmap;

use crate::core::emitter::{ Emitter, EmitterSample, LightSample };
use crate::core::scene::Scene;
use crate::core::shape::SurfaceSample;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

use area::AreaLight;
use envmap::EnvironmentLight;

pub enum Light {
    Area(AreaLight),
    Environment(EnvironmentLight),
}

impl Light {
    fn emitter(&self) -> &dyn Emitter {
        match self {
            Light::Area(l) => l,
            Light::Environment(l) => l,
        }
    }

    /// Solid-angle density of the light's own direction sampling; zero for
    /// lights sampled by area.
    pub fn direction_pdf(&self, dir: &Vector3f) -> Float {
        match self {
            Light::Area(_) => 0.0,
            Light::Environment(l) => l.direction_pdf(dir),
        }
    }
}

impl Emitter for Light {
    fn name(&self) -> &'static str {
        self.emitter().name()
    }

    fn sample(&self, scene: &Scene, reference: &Vector3f, u: &Vector2f) -> Option<EmitterSample> {
        self.emitter().sample(scene, reference, u)
    }

    fn emit(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum {
        self.emitter().emit(sample, reference)
    }

    fn biradiance(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum {
        self.emitter().biradiance(sample, reference)
    }

    fn sample_emission(&self, scene: &Scene, u: &Vector2f) -> Option<SurfaceSample> {
        self.emitter().sample_emission(scene, u)
    }

    fn radiance(&self) -> RGBSpectrum {
        self.emitter().radiance()
    }

    fn is_environment(&self) -> bool {
        self.emitter().is_environment()
    }
}
