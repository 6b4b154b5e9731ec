// Copyright @yucwang 2026

use crate::core::bounce_controller::BounceController;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::trace::SampleTrace;
use crate::integrators::direct::{ combine_balance, sample_direct, DirectSamples, TechniqueSample, Transport };
use crate::integrators::path::trace_path;
use crate::math::constants::{ Float, Matrix2f, Vector2f };
use crate::math::spectrum::RGBSpectrum;

use serde::Serialize;

/// Colour returned when the weight solve is degenerate.
pub const OPTIMAL_MIS_SENTINEL: [Float; 3] = [1.0, 0.0, 0.0];

pub const DEFAULT_PREPROCESS_SAMPLES: u32 = 4;

const SVD_EPSILON: Float = 1e-7;

pub fn sentinel() -> RGBSpectrum {
    RGBSpectrum::new(OPTIMAL_MIS_SENTINEL[0], OPTIMAL_MIS_SENTINEL[1], OPTIMAL_MIS_SENTINEL[2])
}

/// Both techniques' densities and the scalar integrand at one sample.
/// Technique 0 samples lights, technique 1 samples the BSDF.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MisTuple {
    pub pdf0: Float,
    pub pdf1: Float,
    pub f: Float,
}

impl From<&TechniqueSample> for MisTuple {
    fn from(s: &TechniqueSample) -> Self {
        Self { pdf0: s.pdf_light, pdf1: s.pdf_bsdf, f: s.integrand.luminance() }
    }
}

/// Least-squares combination coefficients for a set of samples.
///
/// Accumulates `A = sum W W^T` and `b = sum W S f` with `S = 1 / (p0 + p1)`
/// and `W = (p0, p1) S`, then solves `A alpha = b` through an SVD so a
/// rank-deficient `A` yields the minimum-norm solution. Returns `None` when
/// no sample is usable or the solution is not finite.
pub fn fit_alpha(samples: &[MisTuple]) -> Option<Vector2f> {
    let mut a = Matrix2f::zeros();
    let mut b = Vector2f::zeros();
    let mut used = 0usize;

    for sample in samples {
        let s = 1.0 / (sample.pdf0 + sample.pdf1);
        if !s.is_finite() || !sample.f.is_finite() {
            continue;
        }
        let w = Vector2f::new(sample.pdf0 * s, sample.pdf1 * s);
        a += w * w.transpose();
        b += w * (s * sample.f);
        used += 1;
    }
    if used == 0 {
        return None;
    }

    let alpha = a.svd(true, true).solve(&b, SVD_EPSILON).ok()?;
    if alpha.iter().all(|v| v.is_finite()) {
        Some(alpha)
    } else {
        None
    }
}

/// Combination weights of both techniques at one sample; they sum to one
/// whenever `f` is non-zero and both densities are finite.
pub fn mis_weights(alpha: &Vector2f, sample: &MisTuple) -> (Float, Float) {
    if sample.f == 0.0 {
        return (0.0, 0.0);
    }
    let sum = sample.pdf0 + sample.pdf1;
    let residual = 1.0 - (alpha[0] * sample.pdf0 + alpha[1] * sample.pdf1) / sample.f;
    let w0 = alpha[0] * sample.pdf0 / sample.f + sample.pdf0 / sum * residual;
    let w1 = alpha[1] * sample.pdf1 / sample.f + sample.pdf1 / sum * residual;
    (w0, w1)
}

fn tuples(samples: &DirectSamples) -> Vec<MisTuple> {
    samples.light.iter().chain(samples.bsdf.iter()).map(MisTuple::from).collect()
}

/// Path tracer whose direct-lighting term uses per-pixel fitted weights
/// instead of the balance heuristic.
pub struct OptimalMisIntegrator {
    controller: BounceController,
    preprocess_samples: u32,
    width: usize,
    alphas: Vec<Option<Vector2f>>,
}

impl OptimalMisIntegrator {
    pub fn new(controller: BounceController, preprocess_samples: u32) -> Self {
        Self { controller, preprocess_samples, width: 0, alphas: Vec::new() }
    }

    pub fn alpha_for_pixel(&self, x: usize, y: usize) -> Option<Vector2f> {
        if x >= self.width {
            return None;
        }
        self.alphas.get(y * self.width + x).copied().flatten()
    }

    fn combine(&self, samples: &DirectSamples, pixel: Option<(usize, usize)>) -> RGBSpectrum {
        if samples.delta {
            return combine_balance(samples);
        }
        let pairs = tuples(samples);
        if pairs.iter().all(|t| t.f == 0.0) {
            return RGBSpectrum::default();
        }

        let alpha = pixel
            .and_then(|(x, y)| self.alpha_for_pixel(x, y))
            .or_else(|| fit_alpha(&pairs));
        let alpha = match alpha {
            Some(alpha) => alpha,
            None => {
                log::debug!("degenerate MIS solve at pixel {:?}", pixel);
                return sentinel();
            }
        };

        let mut result = RGBSpectrum::default();
        if let Some(s) = &samples.light {
            if s.pdf_light > 0.0 {
                let (w0, _) = mis_weights(&alpha, &MisTuple::from(s));
                result += s.integrand * (w0 / s.pdf_light);
            }
        }
        if let Some(s) = &samples.bsdf {
            if s.pdf_bsdf > 0.0 {
                let (_, w1) = mis_weights(&alpha, &MisTuple::from(s));
                result += s.integrand * (w1 / s.pdf_bsdf);
            }
        }
        if result.is_finite() { result } else { sentinel() }
    }

    /// Record both techniques along `preprocess_samples` paths through every
    /// pixel and fit one coefficient pair per pixel.
    fn fit_pixels(&mut self, scene: &Scene, sensor: &dyn Sensor, rng: &mut LcgRng) {
        let (width, height) = (sensor.width(), sensor.height());
        let mut alphas = vec![None; width * height];
        let mut degenerate = 0usize;
        let mut trace = SampleTrace::new();

        for y in 0..height {
            for x in 0..width {
                let mut recorded = Vec::new();
                for _ in 0..self.preprocess_samples {
                    let u = Vector2f::new((x as Float + rng.next_f32()) / width as Float,
                                          (y as Float + rng.next_f32()) / height as Float);
                    let ray = sensor.sample_ray(&u);
                    let its = match scene.test_intersect(&ray) {
                        Some(its) => its,
                        None => continue,
                    };
                    trace.reset(Some((x, y)));
                    trace_path(&self.controller, &its, scene, rng, &mut trace, |its, bsdf_sample, rng, trace| {
                        let samples = sample_direct(its, Transport::Surface, bsdf_sample, scene, rng, trace);
                        if !samples.delta {
                            recorded.extend(tuples(&samples));
                        }
                        combine_balance(&samples)
                    });
                }
                if recorded.is_empty() {
                    continue;
                }
                alphas[y * width + x] = fit_alpha(&recorded);
                if alphas[y * width + x].is_none() {
                    degenerate += 1;
                }
            }
        }

        if degenerate > 0 {
            log::warn!("{} pixels produced a degenerate MIS fit and fall back to per-sample solves", degenerate);
        }
        self.width = width;
        self.alphas = alphas;
    }
}

impl Integrator for OptimalMisIntegrator {
    fn name(&self) -> &'static str {
        "optimal_mis"
    }

    fn bounce_controller(&self) -> BounceController {
        self.controller
    }

    fn preprocess(&mut self, scene: &Scene, sensor: &dyn Sensor, rng: &mut LcgRng) {
        log::info!("Fitting MIS weights with {} samples per pixel.", self.preprocess_samples);
        self.fit_pixels(scene, sensor, rng);
        let fitted = self.alphas.iter().filter(|a| a.is_some()).count();
        log::info!("MIS weights fitted for {} of {} pixels.", fitted, self.alphas.len());
    }

    fn li(&self,
          intersection: &SurfaceIntersection<'_>,
          scene: &Scene,
          rng: &mut LcgRng,
          trace: &mut SampleTrace) -> RGBSpectrum {
        let pixel = trace.pixel();
        trace_path(&self.controller, intersection, scene, rng, trace, |its, bsdf_sample, rng, trace| {
            let samples = sample_direct(its, Transport::Surface, bsdf_sample, scene, rng, trace);
            self.combine(&samples, pixel)
        })
    }

    fn debug(&self, intersection: &SurfaceIntersection<'_>, scene: &Scene) -> Option<serde_json::Value> {
        let mut rng = LcgRng::new(0);
        let mut trace = SampleTrace::new();
        let mut recorded = Vec::new();
        for _ in 0..64 {
            let bsdf_sample = intersection.material().sample(intersection, &mut rng);
            let samples = sample_direct(intersection, Transport::Surface, &bsdf_sample, scene, &mut rng, &mut trace);
            recorded.extend(tuples(&samples));
        }
        let alpha = fit_alpha(&recorded);
        let weights: Vec<Option<[Float; 2]>> = recorded.iter()
            .map(|t| alpha.map(|a| mis_weights(&a, t)).map(|(w0, w1)| [w0, w1]))
            .collect();
        let p = intersection.p();
        Some(serde_json::json!({
            "integrator": self.name(),
            "query_point": [p.x, p.y, p.z],
            "alpha": alpha.map(|a| [a[0], a[1]]),
            "samples": recorded,
            "weights": weights,
        }))
    }
}
