// Copyright @yucwang 2026

use crate::core::bounce_controller::BounceController;
use crate::core::emitter::Emitter;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::trace::SampleTrace;
use crate::integrators::direct::{ estimate_direct, Transport };
use crate::integrators::path::PathIntegrator;
use crate::integrators::photon_density::PhotonDensity;
use crate::integrators::photon_map::{ Photon, PhotonMap };
use crate::math::constants::{ Float, Vector3f, EPSILON, PI, TWO_PI };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_cosine_hemisphere;

use indicatif::{ ProgressBar, ProgressStyle };

pub const DEFAULT_PHOTON_COUNT: usize = 100_000;
pub const DEFAULT_PHOTON_BOUNCES: u32 = 2;
pub const DEFAULT_SEARCH_COUNT: usize = 100;

const DEBUG_THETA_STEPS: usize = 16;
const DEBUG_PHI_STEPS: usize = 32;
const DEBUG_SAMPLES: usize = 16;

/// Path tracer whose secondary bounces are drawn from a density fitted to
/// the photons near each shading point.
pub struct DepositerIntegrator {
    controller: BounceController,
    photon_count: usize,
    photon_bounces: u32,
    search_count: usize,
    photons: PhotonMap,
}

impl DepositerIntegrator {
    pub fn new(controller: BounceController,
               photon_count: usize,
               photon_bounces: u32,
               search_count: usize) -> Self {
        Self {
            controller,
            photon_count,
            photon_bounces,
            search_count,
            photons: PhotonMap::new(),
        }
    }

    pub fn photons(&self) -> &PhotonMap {
        &self.photons
    }

    /// Directional density toward the sources of the photons around `its`.
    pub fn density_at(&self, its: &SurfaceIntersection<'_>) -> PhotonDensity {
        let p = its.p();
        let entries: Vec<(Vector3f, Float)> = self.photons.query(&p, self.search_count)
            .iter()
            .filter_map(|photon| {
                let to_source = photon.source - p;
                let dist = to_source.norm();
                if dist > 0.0 {
                    Some((to_source / dist, photon.throughput.luminance()))
                } else {
                    None
                }
            })
            .collect();
        PhotonDensity::with_defaults(&its.facing_sh_normal(), &entries)
    }

    fn trace_photons(&self, scene: &Scene, rng: &mut LcgRng) -> PhotonMap {
        let mut map = PhotonMap::new();
        let emitters: Vec<usize> = (0..scene.lights().len())
            .filter(|idx| !scene.light(*idx).is_environment())
            .collect();
        if emitters.is_empty() || self.photon_count == 0 {
            log::warn!("No emitting surfaces, the photon map stays empty.");
            return map;
        }

        let progress = ProgressBar::new(self.photon_count as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.yellow/blue} {pos}/{len} photons")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let scale = emitters.len() as Float / self.photon_count as Float;
        for _ in 0..self.photon_count {
            let pick = ((rng.next_f32() * emitters.len() as Float) as usize).min(emitters.len() - 1);
            let light = scene.light(emitters[pick]);
            let u = rng.next_2d();
            let origin = match light.sample_emission(scene, &u) {
                Some(origin) => origin,
                None => continue,
            };

            // cosine emission: Le * cos / (cos / pi) = Le * pi
            let frame = Frame::from_normal(&origin.normal);
            let dir = frame.to_world(&sample_cosine_hemisphere(&rng.next_2d()));
            let mut ray = Ray3f::new(origin.point + origin.normal * EPSILON, dir, Some(0.0), None);
            let mut throughput = light.radiance() * (PI * origin.inv_pdf * scale);

            for bounce in 0..self.photon_bounces {
                let hit = match scene.test_intersect(&ray) {
                    Some(hit) => hit,
                    None => break,
                };
                if bounce > 0 {
                    map.push(Photon { position: hit.p(), source: ray.origin(), throughput });
                }

                let sample = hit.material().sample(&hit, rng);
                if !sample.is_valid() {
                    break;
                }
                throughput *= sample.weight(&hit.sh_normal());
                if throughput.is_black() {
                    break;
                }
                ray = hit.spawn_ray(&sample.wi);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        map
    }

    /// Coarse reference of the radiance arriving at `its`, integrated by a
    /// nested path tracer one bounce further along.
    fn incident_map(&self, its: &SurfaceIntersection<'_>, scene: &Scene) -> Vec<Vec<Float>> {
        let nested = PathIntegrator::new(self.controller.copy_after_bounce());
        let frame = Frame::from_normal(&its.facing_sh_normal());
        let mut rng = LcgRng::new(1);
        let mut trace = SampleTrace::new();

        (0..DEBUG_THETA_STEPS).map(|it| {
            (0..DEBUG_PHI_STEPS).map(|ip| {
                let mut sum = 0.0;
                for _ in 0..DEBUG_SAMPLES {
                    let z = (it as Float + rng.next_f32()) / DEBUG_THETA_STEPS as Float;
                    let phi = (ip as Float + rng.next_f32()) / DEBUG_PHI_STEPS as Float * TWO_PI;
                    let r = (1.0 - z * z).max(0.0).sqrt();
                    let dir = frame.to_world(&Vector3f::new(r * phi.cos(), r * phi.sin(), z));
                    trace.reset(None);
                    sum += nested.radiance(&its.spawn_ray(&dir), scene, &mut rng, &mut trace).luminance();
                }
                sum / DEBUG_SAMPLES as Float
            }).collect()
        }).collect()
    }
}

impl Integrator for DepositerIntegrator {
    fn name(&self) -> &'static str {
        "depositer"
    }

    fn bounce_controller(&self) -> BounceController {
        self.controller
    }

    fn preprocess(&mut self, scene: &Scene, _sensor: &dyn Sensor, rng: &mut LcgRng) {
        log::info!("Tracing {} photons with up to {} bounces.", self.photon_count, self.photon_bounces);
        let mut map = self.trace_photons(scene, rng);
        map.build();
        log::info!("Photon map holds {} photons.", map.len());
        self.photons = map;
    }

    fn li(&self,
          intersection: &SurfaceIntersection<'_>,
          scene: &Scene,
          rng: &mut LcgRng,
          trace: &mut SampleTrace) -> RGBSpectrum {
        trace.push_eye_point(intersection.p());

        let mut current = intersection.clone();
        let mut result = RGBSpectrum::default();
        if self.controller.check_counts(1) {
            let bsdf_sample = current.material().sample(&current, rng);
            result += estimate_direct(&current, Transport::Surface, &bsdf_sample, scene, rng, trace);
        }

        let mut modulation = RGBSpectrum::ones();
        let mut bounce = 2;
        while !self.controller.check_done(bounce) {
            let normal = current.facing_sh_normal();
            let (wi, weight) = if current.material().is_delta() {
                let sample = current.material().sample(&current, rng);
                if !sample.is_valid() {
                    break;
                }
                (sample.wi, sample.weight(&current.sh_normal()))
            } else {
                let density = self.density_at(&current);
                let wi = density.sample(rng);
                let cos = wi.dot(&normal);
                assert!(cos >= 0.0, "guided direction below the surface: cos = {}", cos);
                let pdf = density.pdf(&wi);
                if pdf <= 0.0 {
                    break;
                }
                (wi, current.material().f(&current, &wi) * (cos.max(0.0) / pdf))
            };

            let next = match scene.test_intersect(&current.spawn_ray(&wi)) {
                Some(next) => next,
                None => break,
            };
            trace.push_eye_point(next.p());

            modulation *= weight;
            if modulation.is_black() {
                break;
            }

            current = next;
            if self.controller.check_counts(bounce) {
                let bsdf_sample = current.material().sample(&current, rng);
                result += estimate_direct(&current, Transport::Surface, &bsdf_sample, scene, rng, trace) * modulation;
            }
            bounce += 1;
        }

        result
    }

    fn debug(&self, intersection: &SurfaceIntersection<'_>, scene: &Scene) -> Option<serde_json::Value> {
        let p = intersection.p();
        let neighbors: Vec<serde_json::Value> = self.photons.query(&p, self.search_count)
            .iter()
            .map(|photon| serde_json::json!({
                "point": [photon.position.x, photon.position.y, photon.position.z],
                "source": [photon.source.x, photon.source.y, photon.source.z],
                "throughput": photon.throughput.to_array(),
            }))
            .collect();
        let density = self.density_at(intersection);
        Some(serde_json::json!({
            "integrator": self.name(),
            "query_point": [p.x, p.y, p.z],
            "normal": [density.normal().x, density.normal().y, density.normal().z],
            "neighbors": neighbors,
            "density": density.to_json(),
            "incident": self.incident_map(intersection, scene),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneObject;
    use crate::integrators::test_scenes::{ self, Fixture };
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::rectangle::Rectangle;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(Vector3f::new(2.0, 0.0, 1.0), Vector3f::zeros(),
                               Vector3f::new(0.0, 0.0, 1.0), 0.5, 4, 4)
    }

    /// Sphere light between a diffuse floor and a diffuse ceiling.
    fn enclosed() -> Fixture {
        let mut fixture = test_scenes::plane_under_sphere_light(0.5, 4.0, 1.0, 3.0);
        let grey = test_scenes::diffuse(&mut fixture.scene, 0.5);
        let ceiling = Rectangle::new(Vector3f::new(0.0, 0.0, 6.0),
                                     Vector3f::new(0.0, 100.0, 0.0),
                                     Vector3f::new(100.0, 0.0, 0.0));
        fixture.scene.add_object(SceneObject::new(Box::new(ceiling), grey));
        fixture
    }

    #[test]
    #[should_panic(expected = "photon map must be built")]
    fn test_li_before_preprocess_panics() {
        let fixture = enclosed();
        let integrator = DepositerIntegrator::new(BounceController::new(1, 3), 100, 2, 10);
        let mut rng = LcgRng::new(1);
        let mut trace = SampleTrace::new();
        integrator.li(&fixture.query_hit(), &fixture.scene, &mut rng, &mut trace);
    }

    #[test]
    fn test_preprocess_records_secondary_photons() {
        let fixture = enclosed();
        let mut integrator = DepositerIntegrator::new(BounceController::new(1, 3), 2000, 3, 20);
        let mut rng = LcgRng::new(2);
        integrator.preprocess(&fixture.scene, &camera(), &mut rng);

        let photons = integrator.photons();
        assert!(photons.is_built());
        assert!(photons.len() > 500);
        for idx in 0..photons.len() {
            let photon = photons.get(idx);
            assert!(photon.throughput.is_finite());
            assert!(photon.throughput.r() > 0.0);
            assert!(photon.position.z > -1e-3 && photon.position.z < 6.0 + 1e-3);
        }
    }

    #[test]
    fn test_no_emitters_builds_empty_map() {
        let mut scene = Scene::new();
        let grey = test_scenes::diffuse(&mut scene, 0.5);
        scene.add_object(SceneObject::new(test_scenes::floor(), grey));
        let mut integrator = DepositerIntegrator::new(BounceController::new(1, 3), 100, 2, 10);
        let mut rng = LcgRng::new(3);
        integrator.preprocess(&scene, &camera(), &mut rng);
        assert!(integrator.photons().is_built());
        assert!(integrator.photons().is_empty());

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let its = scene.test_intersect(&ray).expect("floor hit");
        let mut trace = SampleTrace::new();
        assert!(integrator.li(&its, &scene, &mut rng, &mut trace).is_black());
    }

    #[test]
    fn test_agrees_with_path_tracer() {
        let fixture = enclosed();
        let controller = BounceController::new(1, 2);
        let mut integrator = DepositerIntegrator::new(controller, 5000, 3, 50);
        let mut rng = LcgRng::new(4);
        integrator.preprocess(&fixture.scene, &camera(), &mut rng);

        let its = fixture.query_hit();
        let path = PathIntegrator::new(controller);
        let mut trace = SampleTrace::new();
        let n = 4000;
        let (mut guided, mut reference) = (0.0f64, 0.0f64);
        for _ in 0..n {
            trace.reset(None);
            let l = integrator.li(&its, &fixture.scene, &mut rng, &mut trace);
            assert!(l.is_finite());
            guided += l.r() as f64;
            reference += path.li(&its, &fixture.scene, &mut rng, &mut trace).r() as f64;
        }
        let (guided, reference) = (guided / n as f64, reference / n as f64);
        assert!((guided - reference).abs() < 0.1 * reference, "{} vs {}", guided, reference);
    }

    #[test]
    fn test_debug_dump() {
        let fixture = enclosed();
        let mut integrator = DepositerIntegrator::new(BounceController::new(1, 2), 500, 2, 8);
        let mut rng = LcgRng::new(5);
        integrator.preprocess(&fixture.scene, &camera(), &mut rng);
        let dump = integrator.debug(&fixture.query_hit(), &fixture.scene).expect("debug output");
        assert_eq!(dump["integrator"], "depositer");
        assert!(dump["neighbors"].as_array().map_or(false, |n| n.len() <= 8 && !n.is_empty()));
        assert_eq!(dump["incident"].as_array().map(|rows| rows.len()), Some(DEBUG_THETA_STEPS));
    }
}
