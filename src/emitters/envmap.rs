// Copyright @yucwang 2026

use crate::core::emitter::{ Emitter, EmitterSample, LightSample, Measure };
use crate::core::scene::Scene;
use crate::io::image_utils::load_bitmap;
use crate::io::ImageError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{ INV_PI, INV_TWO_PI, Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_uniform_sphere, sample_uniform_sphere_pdf };

/// Distance at which environment samples are placed from the shading point.
pub const ENVIRONMENT_DISTANCE: Float = 1.0e5;

/// Infinitely distant light: a constant radiance, optionally modulated by a
/// lat-long image with +y up.
pub struct EnvironmentLight {
    radiance: RGBSpectrum,
    map: Option<Bitmap>,
}

impl EnvironmentLight {
    pub fn constant(radiance: RGBSpectrum) -> Self {
        Self { radiance, map: None }
    }

    pub fn from_bitmap(radiance: RGBSpectrum, map: Bitmap) -> Self {
        Self { radiance, map: Some(map) }
    }

    pub fn from_file(path: &str, scale: RGBSpectrum) -> Result<Self, ImageError> {
        let map = load_bitmap(path)?;
        log::info!("Loaded environment map {} ({}x{}).", path, map.width(), map.height());
        Ok(Self::from_bitmap(scale, map))
    }

    fn dir_to_uv(d: &Vector3f) -> Vector2f {
        let raw_u = d.x.atan2(-d.z) * INV_TWO_PI;
        let u = raw_u - raw_u.floor();
        let v = d.y.max(-1.0).min(1.0).acos() * INV_PI;
        Vector2f::new(u, v)
    }

    /// Radiance seen when looking along `dir`.
    pub fn radiance_from(&self, dir: &Vector3f) -> RGBSpectrum {
        match &self.map {
            None => self.radiance,
            Some(map) => {
                let uv = Self::dir_to_uv(dir);
                let x = ((uv.x * map.width() as Float) as usize).min(map.width() - 1);
                let y = ((uv.y * map.height() as Float) as usize).min(map.height() - 1);
                self.radiance * map[(x, y)]
            }
        }
    }

    pub fn direction_pdf(&self, _dir: &Vector3f) -> Float {
        sample_uniform_sphere_pdf()
    }
}

impl Emitter for EnvironmentLight {
    fn name(&self) -> &'static str {
        "envmap"
    }

    fn sample(&self, _scene: &Scene, reference: &Vector3f, u: &Vector2f) -> Option<EmitterSample> {
        let dir = sample_uniform_sphere(u);
        Some(EmitterSample {
            point: reference + dir * ENVIRONMENT_DISTANCE,
            normal: -dir,
            inv_pdf: 1.0 / sample_uniform_sphere_pdf(),
            measure: Measure::SolidAngle,
        })
    }

    fn emit(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum {
        let dir = sample.point - reference;
        let len = dir.norm();
        if len <= 0.0 {
            return RGBSpectrum::default();
        }
        self.radiance_from(&(dir / len))
    }

    fn biradiance(&self, sample: &LightSample, reference: &Vector3f) -> RGBSpectrum {
        self.emit(sample, reference)
    }

    fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }

    fn is_environment(&self) -> bool {
        true
    }
}
