// Copyright @yucwang 2023

use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::materials::Material;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Direction drawn by a single BSDF variant. `throughput` is the BSDF value
/// for the sampled pair and is NOT divided by the pdf.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    pub pdf: Float,
    pub throughput: RGBSpectrum,
}

impl Default for BSDFSampleRecord {
    fn default() -> Self {
        Self {
            wi: Vector3f::zeros(),
            pdf: 0.0,
            throughput: RGBSpectrum::default(),
        }
    }
}

/// Scattering capability implemented by each material variant. Directions
/// are in world space; delta distributions report zero from `f` and `pdf`.
pub trait BSDF: Send + Sync {
    fn f(&self, intersection: &SurfaceIntersection<'_>, wi: &Vector3f) -> RGBSpectrum;
    fn sample(&self, intersection: &SurfaceIntersection<'_>, rng: &mut LcgRng) -> BSDFSampleRecord;
    fn pdf(&self, intersection: &SurfaceIntersection<'_>, wi: &Vector3f) -> Float;
    fn is_delta(&self) -> bool {
        false
    }
}

/// World-space BSDF sample plus the material that produced it.
#[derive(Clone, Copy)]
pub struct BSDFSample<'a> {
    pub wi: Vector3f,
    pub pdf: Float,
    pub throughput: RGBSpectrum,
    pub material: &'a Material,
}

impl<'a> BSDFSample<'a> {
    pub fn from_record(record: BSDFSampleRecord, material: &'a Material) -> Self {
        Self {
            wi: record.wi,
            pdf: record.pdf,
            throughput: record.throughput,
            material,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0 && !self.throughput.is_black()
    }

    pub fn is_delta(&self) -> bool {
        self.material.is_delta()
    }

    /// `f * |cos| / pdf` against the given shading normal.
    pub fn weight(&self, sh_normal: &Vector3f) -> RGBSpectrum {
        if self.pdf <= 0.0 {
            return RGBSpectrum::default();
        }
        self.throughput * (self.wi.dot(sh_normal).abs() / self.pdf)
    }
}
