// Copyright @yucwang 2026

use crate::core::bounce_controller::BounceController;
use crate::core::bsdf::BSDFSample;
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::trace::SampleTrace;
use crate::integrators::direct::{ estimate_direct, Transport };
use crate::math::spectrum::RGBSpectrum;

/// Iterative BSDF-sampled path with next-event estimation at every vertex.
/// `direct` supplies the direct-lighting term for a vertex and the BSDF
/// sample the path will continue along.
pub fn trace_path<'s, F>(controller: &BounceController,
                         its: &SurfaceIntersection<'s>,
                         scene: &'s Scene,
                         rng: &mut LcgRng,
                         trace: &mut SampleTrace,
                         mut direct: F) -> RGBSpectrum
where
    F: FnMut(&SurfaceIntersection<'s>, &BSDFSample<'s>, &mut LcgRng, &mut SampleTrace) -> RGBSpectrum,
{
    trace.push_eye_point(its.p());

    let mut current = its.clone();
    let mut bsdf_sample = current.material().sample(&current, rng);
    let mut result = RGBSpectrum::default();
    if controller.check_counts(1) {
        result += direct(&current, &bsdf_sample, rng, trace);
    }

    let mut modulation = RGBSpectrum::ones();
    let mut bounce = 2;
    while !controller.check_done(bounce) {
        if bsdf_sample.pdf <= 0.0 {
            break;
        }
        let ray = current.spawn_ray(&bsdf_sample.wi);
        let next = match scene.test_intersect(&ray) {
            Some(next) => next,
            None => break,
        };
        trace.push_eye_point(next.p());

        modulation *= bsdf_sample.weight(&current.sh_normal());
        if modulation.is_black() {
            break;
        }

        current = next;
        bsdf_sample = current.material().sample(&current, rng);
        if controller.check_counts(bounce) {
            result += direct(&current, &bsdf_sample, rng, trace) * modulation;
        }
        bounce += 1;
    }

    result
}

pub struct PathIntegrator {
    controller: BounceController,
}

impl PathIntegrator {
    pub fn new(controller: BounceController) -> Self {
        Self { controller }
    }
}

impl Integrator for PathIntegrator {
    fn name(&self) -> &'static str {
        "path"
    }

    fn bounce_controller(&self) -> BounceController {
        self.controller
    }

    fn li(&self,
          intersection: &SurfaceIntersection<'_>,
          scene: &Scene,
          rng: &mut LcgRng,
          trace: &mut SampleTrace) -> RGBSpectrum {
        trace_path(&self.controller, intersection, scene, rng, trace, |its, bsdf_sample, rng, trace| {
            estimate_direct(its, Transport::Surface, bsdf_sample, scene, rng, trace)
        })
    }

    fn debug(&self, intersection: &SurfaceIntersection<'_>, scene: &Scene) -> Option<serde_json::Value> {
        let mut rng = LcgRng::new(0);
        let mut trace = SampleTrace::new();
        let radiance = self.li(intersection, scene, &mut rng, &mut trace);
        Some(serde_json::json!({
            "integrator": self.name(),
            "radiance": radiance.to_array(),
            "trace": trace.to_json(),
        }))
    }
}
