// Copyright @yucwang 2026

pub mod glass;
pub mod lambertian;
pub mod mirror;
pub mod perfect_transmission;
pub mod phong;

use crate::core::bsdf::{BSDFSample, BSDF};
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

use glass::Glass;
use lambertian::Lambertian;
use mirror::Mirror;
use perfect_transmission::PerfectTransmission;
use phong::Phong;

/// Closed set of surface materials, dispatched to the variant's `BSDF` impl.
pub enum Material {
    Lambertian(Lambertian),
    Mirror(Mirror),
    Glass(Glass),
    PerfectTransmission(PerfectTransmission),
    Phong(Phong),
}

impl Material {
    fn bsdf(&self) -> &dyn BSDF {
        match self {
            Material::Lambertian(m) => m,
            Material::Mirror(m) => m,
            Material::Glass(m) => m,
            Material::PerfectTransmission(m) => m,
            Material::Phong(m) => m,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Material::Lambertian(_) => "lambertian",
            Material::Mirror(_) => "mirror",
            Material::Glass(_) => "glass",
            Material::PerfectTransmission(_) => "transmission",
            Material::Phong(_) => "phong",
        }
    }

    pub fn f(&self, its: &SurfaceIntersection<'_>, wi: &Vector3f) -> RGBSpectrum {
        self.bsdf().f(its, wi)
    }

    pub fn pdf(&self, its: &SurfaceIntersection<'_>, wi: &Vector3f) -> Float {
        self.bsdf().pdf(its, wi)
    }

    pub fn sample(&self, its: &SurfaceIntersection<'_>, rng: &mut LcgRng) -> BSDFSample<'_> {
        BSDFSample::from_record(self.bsdf().sample(its, rng), self)
    }

    pub fn is_delta(&self) -> bool {
        self.bsdf().is_delta()
    }

    /// Invisible boundary that shadow rays may cross.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Material::PerfectTransmission(_))
    }
}
