// Copyright @yucwang 2026

pub mod homogeneous;
pub mod phase;

use crate::core::medium::{ IntegrationResult, Medium };
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::math::constants::Vector3f;
use crate::math::spectrum::RGBSpectrum;

use homogeneous::HomogeneousMedium;
use phase::HenyeyGreenstein;

pub enum MediumModel {
    Vacuum,
    Homogeneous(HomogeneousMedium),
}

impl Medium for MediumModel {
    fn transmittance(&self, a: &Vector3f, b: &Vector3f) -> RGBSpectrum {
        match self {
            MediumModel::Vacuum => RGBSpectrum::ones(),
            MediumModel::Homogeneous(m) => m.transmittance(a, b),
        }
    }

    fn integrate(&self, a: &Vector3f, b: &Vector3f, scene: &Scene, rng: &mut LcgRng) -> IntegrationResult {
        match self {
            MediumModel::Vacuum => IntegrationResult::no_scatter(),
            MediumModel::Homogeneous(m) => m.integrate(a, b, scene, rng),
        }
    }

    fn phase(&self) -> HenyeyGreenstein {
        match self {
            MediumModel::Vacuum => HenyeyGreenstein::isotropic(),
            MediumModel::Homogeneous(m) => m.phase(),
        }
    }
}
