// Copyright @yucwang 2026

use crate::core::bsdf::BSDFSample;
use crate::core::emitter::Emitter;
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::Medium;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::trace::SampleTrace;
use crate::emitters::envmap::ENVIRONMENT_DISTANCE;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

pub(crate) const MAX_BOUNDARY_CROSSINGS: usize = 32;

/// How visibility queries treat pass-through boundaries.
#[derive(Clone, Copy)]
pub enum Transport<'a> {
    /// Every surface blocks light.
    Surface,
    /// Pass-through boundaries are crossed; a medium attenuates.
    Volumetric(Option<&'a dyn Medium>),
}

/// One sample of a direct-lighting technique. Both pdfs are solid-angle
/// densities evaluated at this sample's direction.
#[derive(Debug, Copy, Clone, Default)]
pub struct TechniqueSample {
    /// `L_e * f * |cos| * T`, not divided by any pdf.
    pub integrand: RGBSpectrum,
    pub pdf_light: Float,
    pub pdf_bsdf: Float,
}

/// The light-sampled and BSDF-sampled halves of one direct estimate.
#[derive(Debug, Copy, Clone, Default)]
pub struct DirectSamples {
    pub light: Option<TechniqueSample>,
    pub bsdf: Option<TechniqueSample>,
    /// Delta material: only the BSDF technique applies, with weight one.
    pub delta: bool,
}

pub fn balance_heuristic(pdf: Float, other_pdf: Float) -> Float {
    let sum = pdf + other_pdf;
    if sum > 0.0 { pdf / sum } else { 0.0 }
}

/// Draw both direct-lighting techniques at `its`. The BSDF technique reuses
/// `bsdf_sample`, the direction the caller will also bounce along.
pub fn sample_direct(its: &SurfaceIntersection<'_>,
                     transport: Transport<'_>,
                     bsdf_sample: &BSDFSample<'_>,
                     scene: &Scene,
                     rng: &mut LcgRng,
                     trace: &mut SampleTrace) -> DirectSamples {
    if bsdf_sample.is_delta() {
        return DirectSamples {
            light: None,
            bsdf: bsdf_technique(its, transport, bsdf_sample, scene),
            delta: true,
        };
    }

    DirectSamples {
        light: light_technique(its, transport, scene, rng, trace),
        bsdf: bsdf_technique(its, transport, bsdf_sample, scene),
        delta: false,
    }
}

/// Next-event estimate combined with the BSDF sample by the balance heuristic.
pub fn estimate_direct(its: &SurfaceIntersection<'_>,
                       transport: Transport<'_>,
                       bsdf_sample: &BSDFSample<'_>,
                       scene: &Scene,
                       rng: &mut LcgRng,
                       trace: &mut SampleTrace) -> RGBSpectrum {
    combine_balance(&sample_direct(its, transport, bsdf_sample, scene, rng, trace))
}

pub fn combine_balance(samples: &DirectSamples) -> RGBSpectrum {
    let mut result = RGBSpectrum::default();

    if samples.delta {
        if let Some(s) = samples.bsdf {
            if s.pdf_bsdf > 0.0 {
                result += s.integrand / s.pdf_bsdf;
            }
        }
        return result;
    }

    if let Some(s) = samples.light {
        if s.pdf_light > 0.0 {
            result += s.integrand * (balance_heuristic(s.pdf_light, s.pdf_bsdf) / s.pdf_light);
        }
    }
    if let Some(s) = samples.bsdf {
        if s.pdf_bsdf > 0.0 {
            result += s.integrand * (balance_heuristic(s.pdf_bsdf, s.pdf_light) / s.pdf_bsdf);
        }
    }
    result
}

fn light_technique(its: &SurfaceIntersection<'_>,
                   transport: Transport<'_>,
                   scene: &Scene,
                   rng: &mut LcgRng,
                   trace: &mut SampleTrace) -> Option<TechniqueSample> {
    let p = its.p();
    let sample = scene.sample_direct_lights(&p, rng)?;
    let (shadow_ray, _) = its.spawn_ray_to(&sample.point);
    let wi = shadow_ray.dir();

    let transmittance = match transport {
        Transport::Surface => {
            if scene.test_occlusion(&shadow_ray, shadow_ray.max_t) {
                RGBSpectrum::default()
            } else {
                RGBSpectrum::ones()
            }
        }
        Transport::Volumetric(medium) => scene.shadow_transmittance(&shadow_ray.origin(), &sample.point, medium),
    };
    trace.push_shadow_test(p, sample.point, transmittance.is_black());

    let pdf_light = sample.solid_angle_pdf(&p);
    if pdf_light <= 0.0 {
        return None;
    }
    let material = its.material();
    let pdf_bsdf = material.pdf(its, &wi);
    if transmittance.is_black() {
        return Some(TechniqueSample { integrand: RGBSpectrum::default(), pdf_light, pdf_bsdf });
    }

    let light = scene.light(sample.light);
    let cos = wi.dot(&its.sh_normal()).abs();
    let estimate = light.biradiance(&sample, &p) * material.f(its, &wi) * transmittance * (cos * sample.inv_pdf);
    Some(TechniqueSample { integrand: estimate * pdf_light, pdf_light, pdf_bsdf })
}

fn bsdf_technique(its: &SurfaceIntersection<'_>,
                  transport: Transport<'_>,
                  bsdf_sample: &BSDFSample<'_>,
                  scene: &Scene) -> Option<TechniqueSample> {
    if !bsdf_sample.is_valid() {
        return None;
    }
    let wi = bsdf_sample.wi;
    let (radiance, pdf_light, transmittance) = match find_emitter(its, &wi, transport, scene) {
        Some(found) => found,
        // no light along `wi`: a zero sample, still drawn by the BSDF technique
        None => return Some(TechniqueSample { integrand: RGBSpectrum::default(), pdf_light: 0.0, pdf_bsdf: bsdf_sample.pdf }),
    };
    let cos = wi.dot(&its.sh_normal()).abs();
    Some(TechniqueSample {
        integrand: radiance * bsdf_sample.throughput * transmittance * cos,
        pdf_light,
        pdf_bsdf: bsdf_sample.pdf,
    })
}

/// Follow `wi` from `its` to the first emitter, returning its radiance, the
/// light-sampling density of that point and the transmittance on the way.
fn find_emitter(its: &SurfaceIntersection<'_>,
                wi: &Vector3f,
                transport: Transport<'_>,
                scene: &Scene) -> Option<(RGBSpectrum, Float, RGBSpectrum)> {
    let (crossing, mut medium) = match transport {
        Transport::Surface => (false, None),
        Transport::Volumetric(medium) => (true, medium),
    };
    let mut ray = its.spawn_ray(wi);
    let mut transmittance = RGBSpectrum::ones();

    for _ in 0..MAX_BOUNDARY_CROSSINGS {
        let hit = match scene.test_intersect(&ray) {
            Some(hit) => hit,
            None => {
                let radiance = scene.environment_radiance(wi);
                if radiance.is_black() {
                    return None;
                }
                if let Some(m) = medium {
                    transmittance *= m.transmittance(&ray.origin(), &ray.at(ENVIRONMENT_DISTANCE));
                }
                return Some((radiance, scene.environment_pdf(wi), transmittance));
            }
        };

        if let Some(m) = medium {
            transmittance *= m.transmittance(&ray.origin(), &hit.p());
        }

        if crossing && hit.material().is_passthrough() {
            medium = if wi.dot(&hit.geo_normal()) < 0.0 {
                scene.interior_medium(hit.object())
            } else {
                None
            };
            ray = hit.spawn_ray(wi);
            continue;
        }

        let radiance = hit.emitted_toward(&-wi);
        if radiance.is_black() {
            return None;
        }
        return Some((radiance, scene.lights_pdf(&its.p(), &hit), transmittance));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrators::test_scenes;

    #[test]
    fn test_balance_weights_sum_to_one() {
        for &(a, b) in &[(0.3, 0.7), (1e-4, 12.0), (5.0, 5.0), (0.0, 2.0)] {
            let sum = balance_heuristic(a, b) + balance_heuristic(b, a);
            assert!((sum - 1.0).abs() < 1e-6);
        }
        assert_eq!(balance_heuristic(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_records_shadow_tests() {
        let fixture = test_scenes::plane_under_sphere_light(0.5, 4.0, 1.0, 3.0);
        let its = fixture.query_hit();
        let mut rng = LcgRng::new(1);
        let mut trace = SampleTrace::new();
        for _ in 0..16 {
            let bsdf_sample = its.material().sample(&its, &mut rng);
            estimate_direct(&its, Transport::Surface, &bsdf_sample, &fixture.scene, &mut rng, &mut trace);
        }
        assert_eq!(trace.shadow_tests().len(), 16);
        assert!(trace.shadow_tests().iter().all(|t| (t.shading_point - its.p()).norm() < 1e-6));
    }

    #[test]
    fn test_bsdf_technique_keeps_misses() {
        let fixture = test_scenes::plane_under_sphere_light(0.5, 4.0, 1.0, 3.0);
        let its = fixture.query_hit();
        let mut rng = LcgRng::new(6);
        let mut trace = SampleTrace::new();
        let mut misses = 0;
        for _ in 0..200 {
            let bsdf_sample = its.material().sample(&its, &mut rng);
            let samples = sample_direct(&its, Transport::Surface, &bsdf_sample, &fixture.scene, &mut rng, &mut trace);
            let bsdf = samples.bsdf.expect("a valid BSDF sample is always recorded");
            assert!(bsdf.pdf_bsdf > 0.0);
            if bsdf.integrand.is_black() {
                assert_eq!(bsdf.pdf_light, 0.0);
                misses += 1;
            }
        }
        // the light covers a small cone above the floor
        assert!(misses > 100);
    }

    #[test]
    fn test_direct_matches_analytic_irradiance() {
        let (albedo, le, radius, height) = (0.5, 4.0, 1.0, 3.0);
        let fixture = test_scenes::plane_under_sphere_light(albedo, le, radius, height);
        let its = fixture.query_hit();
        let mut rng = LcgRng::new(17);
        let mut trace = SampleTrace::new();
        let n = 20000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let bsdf_sample = its.material().sample(&its, &mut rng);
            trace.reset(None);
            sum += estimate_direct(&its, Transport::Surface, &bsdf_sample, &fixture.scene, &mut rng, &mut trace).r() as f64;
        }
        let mean = (sum / n as f64) as Float;
        let expected = test_scenes::sphere_light_radiance(albedo, le, radius, height);
        assert!((mean - expected).abs() < 0.04 * expected, "mean {} expected {}", mean, expected);
    }
}
