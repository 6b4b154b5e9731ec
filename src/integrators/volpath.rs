// Copyright @yucwang 2026

use crate::core::bounce_controller::BounceController;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::Medium;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::trace::SampleTrace;
use crate::integrators::direct::{ estimate_direct, Transport, MAX_BOUNDARY_CROSSINGS };
use crate::media::phase::HenyeyGreenstein;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Where the path currently sits.
#[derive(Clone)]
enum Vertex<'s> {
    Surface(SurfaceIntersection<'s>),
    Scatter { point: Vector3f, wo: Vector3f },
}

impl Vertex<'_> {
    fn is_boundary(&self) -> bool {
        match self {
            Vertex::Surface(its) => its.material().is_passthrough(),
            Vertex::Scatter { .. } => false,
        }
    }
}

/// Bounce bookkeeping, moved through each step of the loop. Pass-through
/// boundaries are not bounces: `bounce` only advances when leaving a
/// surface that scatters or a medium scatter point.
struct LoopState<'s> {
    bounce: u32,
    vertex: Vertex<'s>,
    modulation: RGBSpectrum,
    result: RGBSpectrum,
    medium: Option<&'s dyn Medium>,
    primary: bool,
    crossings: usize,
}

enum Step<'s> {
    Continue(LoopState<'s>),
    Done(RGBSpectrum),
}

pub struct VolPathIntegrator {
    controller: BounceController,
}

impl VolPathIntegrator {
    pub fn new(controller: BounceController) -> Self {
        Self { controller }
    }

    /// Pick the next direction at the current vertex, adding its direct term.
    /// Returns the ray to follow and the throughput factor for it.
    fn scatter<'s>(&self,
                   state: &mut LoopState<'s>,
                   scene: &'s Scene,
                   rng: &mut LcgRng,
                   trace: &mut SampleTrace) -> Option<(Ray3f, RGBSpectrum)> {
        match &state.vertex {
            Vertex::Surface(its) => {
                let bsdf_sample = its.material().sample(its, rng);
                let wi = bsdf_sample.wi;
                let n = its.geo_normal();
                if its.wo().dot(&n) * wi.dot(&n) < 0.0 {
                    state.medium = if wi.dot(&n) < 0.0 {
                        scene.interior_medium(its.object())
                    } else {
                        None
                    };
                }

                // Direct estimates already see through boundaries, so the light
                // behind one belongs to the vertex the straight chain started
                // from. Only the camera has no such vertex.
                let counts = if its.material().is_passthrough() {
                    state.primary && self.controller.check_counts(0)
                } else {
                    self.controller.check_counts(state.bounce)
                };
                if counts {
                    let ld = estimate_direct(its, Transport::Volumetric(state.medium), &bsdf_sample, scene, rng, trace);
                    state.result += ld * state.modulation;
                }
                if bsdf_sample.pdf <= 0.0 {
                    return None;
                }
                Some((its.spawn_ray(&wi), bsdf_sample.weight(&its.sh_normal())))
            }
            Vertex::Scatter { point, wo } => {
                let phase = state.medium.map(|m| m.phase()).unwrap_or_else(HenyeyGreenstein::isotropic);
                let wi = phase.sample(wo, &rng.next_2d());
                Some((Ray3f::new(*point, wi, Some(0.0), None), RGBSpectrum::ones()))
            }
        }
    }

    fn step<'s>(&self,
                mut state: LoopState<'s>,
                scene: &'s Scene,
                rng: &mut LcgRng,
                trace: &mut SampleTrace) -> Step<'s> {
        let crossing = state.vertex.is_boundary();
        let (ray, weight) = match self.scatter(&mut state, scene, rng, trace) {
            Some(next) => next,
            None => return Step::Done(state.result),
        };
        state.primary = false;

        if crossing {
            state.crossings += 1;
            if state.crossings > MAX_BOUNDARY_CROSSINGS {
                return Step::Done(state.result);
            }
        } else {
            state.crossings = 0;
            state.bounce += 1;
            if self.controller.check_done(state.bounce) {
                return Step::Done(state.result);
            }
        }

        let hit = scene.test_intersect(&ray);

        if let Some(medium) = state.medium {
            if let Some(its) = &hit {
                let event = medium.integrate(&ray.origin(), &its.p(), scene, rng);
                if event.should_scatter {
                    state.modulation *= weight * event.weight;
                    if state.modulation.is_black() {
                        return Step::Done(state.result);
                    }
                    if self.controller.check_counts(state.bounce) {
                        state.result += event.ld * state.modulation;
                    }
                    trace.push_eye_point(event.scatter_point);
                    state.vertex = Vertex::Scatter { point: event.scatter_point, wo: -ray.dir() };
                    return Step::Continue(state);
                }
                state.modulation *= event.weight;
            }
        }

        let next = match hit {
            Some(next) => next,
            None => return Step::Done(state.result),
        };
        trace.push_eye_point(next.p());

        state.modulation *= weight;
        if state.modulation.is_black() {
            return Step::Done(state.result);
        }
        state.vertex = Vertex::Surface(next);
        Step::Continue(state)
    }
}

impl Integrator for VolPathIntegrator {
    fn name(&self) -> &'static str {
        "volpath"
    }

    fn bounce_controller(&self) -> BounceController {
        self.controller
    }

    fn li(&self,
          intersection: &SurfaceIntersection<'_>,
          scene: &Scene,
          rng: &mut LcgRng,
          trace: &mut SampleTrace) -> RGBSpectrum {
        trace.push_eye_point(intersection.p());

        let mut state = LoopState {
            bounce: 1,
            vertex: Vertex::Surface(intersection.clone()),
            modulation: RGBSpectrum::ones(),
            result: RGBSpectrum::default(),
            medium: None,
            primary: true,
            crossings: 0,
        };
        loop {
            state = match self.step(state, scene, rng, trace) {
                Step::Continue(next) => next,
                Step::Done(result) => return result,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneObject;
    use crate::integrators::path::PathIntegrator;
    use crate::integrators::test_scenes;
    use crate::materials::perfect_transmission::PerfectTransmission;
    use crate::materials::Material;
    use crate::math::constants::{ Float, INV_FOUR_PI, INV_PI, PI };
    use crate::media::homogeneous::HomogeneousMedium;
    use crate::media::MediumModel;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;

    #[test]
    fn test_vacuum_matches_path_tracer() {
        let fixture = test_scenes::plane_under_sphere_light(0.7, 3.0, 1.0, 2.5);
        let its = fixture.query_hit();
        let controller = BounceController::new(1, 4);
        let path = PathIntegrator::new(controller);
        let volpath = VolPathIntegrator::new(controller);

        let mut rng_a = LcgRng::new(31);
        let mut rng_b = LcgRng::new(31);
        let mut trace = SampleTrace::new();
        for _ in 0..500 {
            let a = path.li(&its, &fixture.scene, &mut rng_a, &mut trace);
            let b = volpath.li(&its, &fixture.scene, &mut rng_b, &mut trace);
            assert!((a - b).max_component().abs() < 1e-5 * a.max_component().max(1.0));
        }
    }

    fn fog_ball_scene(medium: MediumModel) -> test_scenes::Fixture {
        let mut scene = crate::core::scene::Scene::new();
        let floor = test_scenes::diffuse(&mut scene, 0.5);
        let black = test_scenes::diffuse(&mut scene, 0.0);
        let boundary = scene.add_material(Material::PerfectTransmission(PerfectTransmission::new()));
        let fog = scene.add_medium(medium);

        scene.add_object(SceneObject::new(test_scenes::floor(), floor));
        let light = Rectangle::new(Vector3f::new(0.0, 0.0, 4.0),
                                   Vector3f::new(0.0, 0.5, 0.0),
                                   Vector3f::new(0.5, 0.0, 0.0));
        scene.add_object(SceneObject::new(Box::new(light), black).with_emission(RGBSpectrum::splat(10.0)));
        scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 2.0), 1.0)), boundary)
            .with_interior_medium(Some(fog)));

        let origin = Vector3f::new(2.0, 0.0, 1.0);
        test_scenes::Fixture { scene, query: Ray3f::new(origin, -origin, None, None) }
    }

    #[test]
    fn test_absorbing_medium_attenuates() {
        let clear = fog_ball_scene(MediumModel::Vacuum);
        let absorbing = fog_ball_scene(MediumModel::Homogeneous(
            HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.0), 0.0)));
        let integrator = VolPathIntegrator::new(BounceController::new(1, 1));

        let mut trace = SampleTrace::new();
        let mut estimate = |fixture: &test_scenes::Fixture| {
            let its = fixture.query_hit();
            let mut rng = LcgRng::new(77);
            let mut sum = 0.0;
            for _ in 0..4000 {
                sum += integrator.li(&its, &fixture.scene, &mut rng, &mut trace).r();
            }
            sum
        };
        let l_clear = estimate(&clear);
        let l_fog = estimate(&absorbing);
        assert!(l_clear > 0.0);
        let ratio = l_fog / l_clear;
        // chord through the ball is close to its diameter
        assert!(ratio > 0.33 && ratio < 0.40, "ratio {}", ratio);
    }

    fn mean_li(integrator: &VolPathIntegrator, fixture: &test_scenes::Fixture, seed: u64, n: usize) -> Float {
        let its = fixture.query_hit();
        let mut rng = LcgRng::new(seed);
        let mut trace = SampleTrace::new();
        let mut sum = 0.0f64;
        for _ in 0..n {
            trace.reset(None);
            sum += integrator.li(&its, &fixture.scene, &mut rng, &mut trace).r() as f64;
        }
        (sum / n as f64) as Float
    }

    #[test]
    fn test_vacuum_boundary_leaves_radiance_unchanged() {
        let (albedo, le, radius, height) = (0.5, 4.0, 1.0, 3.0);
        let plain = test_scenes::plane_under_sphere_light(albedo, le, radius, height);
        let mut bounded = test_scenes::plane_under_sphere_light(albedo, le, radius, height);
        let boundary = bounded.scene.add_material(Material::PerfectTransmission(PerfectTransmission::new()));
        bounded.scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 1.2), 0.6)), boundary));

        let integrator = VolPathIntegrator::new(BounceController::new(1, 3));
        let expected = test_scenes::sphere_light_radiance(albedo, le, radius, height);
        let l_plain = mean_li(&integrator, &plain, 5, 20000);
        let l_bounded = mean_li(&integrator, &bounded, 5, 20000);
        assert!((l_plain - expected).abs() < 0.04 * expected, "plain {} expected {}", l_plain, expected);
        assert!((l_bounded - expected).abs() < 0.04 * expected, "bounded {} expected {}", l_bounded, expected);
    }

    #[test]
    fn test_camera_sees_light_through_boundary() {
        let mut scene = crate::core::scene::Scene::new();
        let black = test_scenes::diffuse(&mut scene, 0.0);
        let boundary = scene.add_material(Material::PerfectTransmission(PerfectTransmission::new()));
        let light = Rectangle::new(Vector3f::new(0.0, 0.0, 4.0),
                                   Vector3f::new(0.0, 2.0, 0.0),
                                   Vector3f::new(2.0, 0.0, 0.0));
        scene.add_object(SceneObject::new(Box::new(light), black).with_emission(RGBSpectrum::splat(3.0)));
        scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 2.0), 0.5)), boundary));
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);

        let integrator = VolPathIntegrator::new(BounceController::new(0, 3));
        let mut rng = LcgRng::new(2);
        let mut trace = SampleTrace::new();
        let l = integrator.radiance(&ray, &scene, &mut rng, &mut trace);
        assert!((l.r() - 3.0).abs() < 1e-4, "radiance {}", l.r());

        let skip_emission = VolPathIntegrator::new(BounceController::new(1, 3));
        assert!(skip_emission.radiance(&ray, &scene, &mut rng, &mut trace).is_black());
    }

    #[test]
    fn test_absorbing_medium_ignores_extra_bounces() {
        let fixture = fog_ball_scene(MediumModel::Homogeneous(
            HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.0), 0.0)));
        let one = mean_li(&VolPathIntegrator::new(BounceController::new(1, 1)), &fixture, 8, 10000);
        let three = mean_li(&VolPathIntegrator::new(BounceController::new(1, 3)), &fixture, 9, 10000);
        assert!(one > 0.0);
        assert!((three / one - 1.0).abs() < 0.03, "one {} three {}", one, three);
    }

    /// Length of the segment `a -> b` inside the fog ball of `fog_ball_scene`.
    fn length_in_ball(a: &Vector3f, b: &Vector3f) -> Float {
        let center = Vector3f::new(0.0, 0.0, 2.0);
        let d = b - a;
        let len = d.norm();
        let dir = d / len;
        let oc = a - center;
        let half_b = oc.dot(&dir);
        let disc = half_b * half_b - (oc.norm_squared() - 1.0);
        if disc <= 0.0 {
            return 0.0;
        }
        let sq = disc.sqrt();
        ((-half_b + sq).min(len) - (-half_b - sq).max(0.0)).max(0.0)
    }

    /// Floor radiance from light scattered exactly once in an isotropic
    /// ball, integrated over the ball volume and the light area.
    fn single_scatter_reference(sigma: Float, albedo: Float, floor_albedo: Float, le: Float, n: usize) -> Float {
        let mut rng = LcgRng::new(1234);
        let volume = 4.0 / 3.0 * PI;
        let area = 0.25;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let x = loop {
                let v = Vector3f::new(rng.next_f32(), rng.next_f32(), rng.next_f32()) * 2.0
                    - Vector3f::new(1.0, 1.0, 1.0);
                if v.norm_squared() <= 1.0 {
                    break v + Vector3f::new(0.0, 0.0, 2.0);
                }
            };
            let y = Vector3f::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, 0.0) * 0.5 + Vector3f::new(0.0, 0.0, 4.0);

            let dist_x = x.norm();
            let cos_x = x.z / dist_x;
            let to_light = y - x;
            let dist_y = to_light.norm();
            let cos_y = to_light.z / dist_y;
            let tr = (-sigma * (length_in_ball(&Vector3f::zeros(), &x) + length_in_ball(&x, &y))).exp();
            let value = cos_x / (dist_x * dist_x) * sigma * albedo * INV_FOUR_PI * le * tr * cos_y / (dist_y * dist_y);
            sum += value as f64;
        }
        floor_albedo * INV_PI * volume * area * (sum / n as f64) as Float
    }

    #[test]
    fn test_single_scattering_matches_volume_integral() {
        let (sigma, albedo) = (1.0, 0.8);
        let fixture = fog_ball_scene(MediumModel::Homogeneous(
            HomogeneousMedium::new(RGBSpectrum::splat(sigma), RGBSpectrum::splat(albedo), 0.0)));
        // bounce 2 is the first scatter point in the ball
        let integrator = VolPathIntegrator::new(BounceController::new(2, 2));
        let estimate = mean_li(&integrator, &fixture, 21, 40000);
        let expected = single_scatter_reference(sigma, albedo, 0.5, 10.0, 400000);
        assert!(expected > 0.0);
        assert!((estimate - expected).abs() < 0.08 * expected, "estimate {} expected {}", estimate, expected);
    }

    #[test]
    fn test_scattering_medium_vertices_are_traced() {
        let fixture = fog_ball_scene(MediumModel::Homogeneous(
            HomogeneousMedium::new(RGBSpectrum::splat(5.0), RGBSpectrum::splat(0.9), 0.3)));
        let integrator = VolPathIntegrator::new(BounceController::new(1, 6));
        let its = fixture.query_hit();
        let mut rng = LcgRng::new(4);
        let mut inside = 0;
        for _ in 0..500 {
            let mut trace = SampleTrace::new();
            let l = integrator.li(&its, &fixture.scene, &mut rng, &mut trace);
            assert!(l.is_finite());
            inside += trace.eye_points().iter()
                .filter(|p| (*p - Vector3f::new(0.0, 0.0, 2.0)).norm() < 0.999)
                .count();
        }
        assert!(inside > 0);
    }
}
