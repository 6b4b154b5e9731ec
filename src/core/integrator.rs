// Copyright @yucwang 2026

use crate::core::bounce_controller::BounceController;
use crate::core::interaction::SurfaceIntersection;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::trace::SampleTrace;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub trait Integrator: Sync {
    fn name(&self) -> &'static str;

    fn bounce_controller(&self) -> BounceController;

    /// One-time work before any `li` call. Runs single-threaded.
    fn preprocess(&mut self, _scene: &Scene, _sensor: &dyn Sensor, _rng: &mut LcgRng) {}

    /// Radiance leaving `intersection` toward its `wo`, excluding the
    /// surface's own emission.
    fn li(&self,
          intersection: &SurfaceIntersection<'_>,
          scene: &Scene,
          rng: &mut LcgRng,
          trace: &mut SampleTrace) -> RGBSpectrum;

    /// Radiance arriving along a camera ray. A miss contributes nothing.
    fn radiance(&self, ray: &Ray3f, scene: &Scene, rng: &mut LcgRng, trace: &mut SampleTrace) -> RGBSpectrum {
        let its = match scene.test_intersect(ray) {
            Some(its) => its,
            None => return RGBSpectrum::default(),
        };
        trace.push_eye_point(ray.origin());

        let mut result = self.li(&its, scene, rng, trace);
        if self.bounce_controller().check_counts(0) {
            result += its.emitted_toward(&its.wo());
        }
        result
    }

    /// Offline dump of intermediate state at `intersection`.
    fn debug(&self, _intersection: &SurfaceIntersection<'_>, _scene: &Scene) -> Option<serde_json::Value> {
        None
    }
}
