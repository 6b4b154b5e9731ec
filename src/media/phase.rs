// Copyright @yucwang 2026

use crate::math::constants::{ INV_FOUR_PI, TWO_PI, Float, Vector2f, Vector3f };
use crate::math::frame::Frame;

/// Henyey-Greenstein phase function. `wo` points back along the incoming
/// path, `wi` is the scattered direction; `g > 0` favours forward scattering.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HenyeyGreenstein {
    g: Float,
}

impl HenyeyGreenstein {
    pub fn new(g: Float) -> Self {
        debug_assert!(g > -1.0 && g < 1.0, "Henyey-Greenstein g must lie in (-1, 1), got {}", g);
        Self { g }
    }

    pub fn isotropic() -> Self {
        Self { g: 0.0 }
    }

    pub fn g(&self) -> Float {
        self.g
    }

    fn eval_cos(&self, cos_theta: Float) -> Float {
        let g = self.g;
        let denom = 1.0 + g * g - 2.0 * g * cos_theta;
        INV_FOUR_PI * (1.0 - g * g) / (denom * denom.max(0.0).sqrt())
    }

    pub fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.eval_cos((-wo).dot(wi))
    }

    /// Phase-sampled direction; its pdf equals `eval`.
    pub fn sample(&self, wo: &Vector3f, u: &Vector2f) -> Vector3f {
        let g = self.g;
        let cos_theta = if g.abs() < 1e-3 {
            1.0 - 2.0 * u.x
        } else {
            let sqr = (1.0 - g * g) / (1.0 - g + 2.0 * g * u.x);
            (1.0 + g * g - sqr * sqr) / (2.0 * g)
        };
        let cos_theta = cos_theta.max(-1.0).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = TWO_PI * u.y;
        let local = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        Frame::from_normal(&(-wo)).to_world(&local)
    }

    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.eval(wo, wi)
    }
}
