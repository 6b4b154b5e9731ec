// Copyright @yucwang 2026

use crate::core::emitter::Emitter;
use crate::core::medium::{ IntegrationResult, Medium };
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::media::phase::HenyeyGreenstein;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Medium with constant RGB extinction and single-scattering albedo.
pub struct HomogeneousMedium {
    sigma_t: RGBSpectrum,
    albedo: RGBSpectrum,
    phase: HenyeyGreenstein,
}

impl HomogeneousMedium {
    pub fn new(sigma_t: RGBSpectrum, albedo: RGBSpectrum, g: Float) -> Self {
        Self {
            sigma_t,
            albedo: clamp_spectrum(albedo),
            phase: HenyeyGreenstein::new(g),
        }
    }

    pub fn sigma_t(&self) -> RGBSpectrum {
        self.sigma_t
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }

    fn transmittance_over(&self, distance: Float) -> RGBSpectrum {
        (self.sigma_t * -distance).exp()
    }

    /// Light-sampled in-scattered radiance at `p` toward `wo`.
    fn in_scattered(&self, p: &Vector3f, wo: &Vector3f, scene: &Scene, rng: &mut LcgRng) -> RGBSpectrum {
        let sample = match scene.sample_direct_lights(p, rng) {
            Some(sample) => sample,
            None => return RGBSpectrum::default(),
        };
        let to_light = sample.point - p;
        let dist = to_light.norm();
        if dist <= 0.0 {
            return RGBSpectrum::default();
        }
        let wi = to_light / dist;
        let light = scene.light(sample.light);
        let biradiance = light.biradiance(&sample, p);
        if biradiance.is_black() {
            return RGBSpectrum::default();
        }
        let tr = scene.shadow_transmittance(p, &sample.point, Some(self as &dyn Medium));
        if tr.is_black() {
            return RGBSpectrum::default();
        }
        biradiance * tr * (self.phase.eval(wo, &wi) * sample.inv_pdf)
    }
}

impl Medium for HomogeneousMedium {
    fn transmittance(&self, a: &Vector3f, b: &Vector3f) -> RGBSpectrum {
        self.transmittance_over((b - a).norm())
    }

    fn integrate(&self, a: &Vector3f, b: &Vector3f, scene: &Scene, rng: &mut LcgRng) -> IntegrationResult {
        let segment = b - a;
        let dist = segment.norm();
        let sigma = self.sigma_t.average();
        if sigma <= 0.0 || dist <= 0.0 {
            return IntegrationResult::no_scatter();
        }
        let dir = segment / dist;

        let t = -(1.0 - rng.next_f32()).ln() / sigma;
        if t >= dist {
            let weight = self.transmittance_over(dist) / (-sigma * dist).exp();
            return IntegrationResult::pass_through(weight);
        }

        let pdf = sigma * (-sigma * t).exp();
        let weight = self.albedo * self.sigma_t * self.transmittance_over(t) / pdf;
        let p = a + dir * t;
        let ld = self.in_scattered(&p, &(-dir), scene, rng);
        IntegrationResult::scatter(weight, ld, p)
    }

    fn phase(&self) -> HenyeyGreenstein {
        self.phase
    }
}

fn clamp_spectrum(value: RGBSpectrum) -> RGBSpectrum {
    RGBSpectrum::new(
        value[0].clamp(0.0, 1.0),
        value[1].clamp(0.0, 1.0),
        value[2].clamp(0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beer_lambert() {
        let medium = HomogeneousMedium::new(RGBSpectrum::new(1.0, 0.5, 0.0), RGBSpectrum::splat(0.5), 0.0);
        let tr = medium.transmittance(&Vector3f::zeros(), &Vector3f::new(0.0, 2.0, 0.0));
        assert!((tr.r() - (-2.0f32).exp()).abs() < 1e-6);
        assert!((tr.g() - (-1.0f32).exp()).abs() < 1e-6);
        assert!((tr.b() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_expected_weight_is_unbiased() {
        // E[pass-through weight] must equal transmittance for a purely absorbing grey medium.
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.8), RGBSpectrum::splat(0.0), 0.0);
        let scene = Scene::new();
        let mut rng = LcgRng::new(21);
        let a = Vector3f::zeros();
        let b = Vector3f::new(0.0, 0.0, 1.5);
        let n = 20000;
        let mut passed = 0.0;
        for _ in 0..n {
            let result = medium.integrate(&a, &b, &scene, &mut rng);
            if !result.should_scatter {
                passed += result.weight.r();
            } else {
                assert!(result.weight.is_black());
                assert!((result.scatter_point - a).norm() < 1.5);
            }
        }
        let expected = (-0.8f32 * 1.5).exp();
        assert!((passed / n as Float - expected).abs() < 0.02);
    }

    #[test]
    fn test_clamps_albedo() {
        let medium = HomogeneousMedium::new(RGBSpectrum::ones(), RGBSpectrum::new(2.0, -1.0, 0.5), 0.3);
        assert_eq!(medium.albedo(), RGBSpectrum::new(1.0, 0.0, 0.5));
        assert!((medium.phase().g() - 0.3).abs() < 1e-6);
    }
}
