// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, Vector3f, INV_PI, TWO_PI };
use crate::math::frame::Frame;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

pub const DEFAULT_THETA_BINS: usize = 8;
pub const DEFAULT_PHI_BINS: usize = 16;
pub const DEFAULT_COSINE_MIX: Float = 0.2;

/// Piecewise-constant hemisphere density around a surface normal, mixed with
/// a cosine lobe so every direction above the surface keeps a non-zero pdf.
///
/// Bins are uniform in `cos(theta)` and `phi`, so each covers the same solid
/// angle `2 pi / (theta_bins * phi_bins)`.
pub struct PhotonDensity {
    frame: Frame,
    theta_bins: usize,
    phi_bins: usize,
    bin_pdf: Vec<Float>,
    cdf: Vec<Float>,
    cosine_mix: Float,
}

impl PhotonDensity {
    /// `entries` are world-space directions with non-negative weights.
    /// Entries below the surface are ignored. Without positive weight the
    /// density degrades to the pure cosine lobe.
    pub fn new(normal: &Vector3f,
               entries: &[(Vector3f, Float)],
               theta_bins: usize,
               phi_bins: usize,
               cosine_mix: Float) -> Self {
        assert!(theta_bins > 0 && phi_bins > 0, "photon density needs at least one bin");
        let frame = Frame::from_normal(normal);
        let mut weights = vec![0.0; theta_bins * phi_bins];
        for (dir, weight) in entries {
            if !(*weight > 0.0) || !weight.is_finite() {
                continue;
            }
            if let Some(idx) = Self::bin_index(&frame.to_local(dir), theta_bins, phi_bins) {
                weights[idx] += weight;
            }
        }

        let total: Float = weights.iter().sum();
        let mut density = Self {
            frame,
            theta_bins,
            phi_bins,
            bin_pdf: vec![0.0; weights.len()],
            cdf: Vec::with_capacity(weights.len()),
            cosine_mix,
        };
        if total > 0.0 {
            let bin_solid_angle = TWO_PI / weights.len() as Float;
            let mut running = 0.0;
            for (idx, w) in weights.iter().enumerate() {
                running += w / total;
                density.cdf.push(running);
                density.bin_pdf[idx] = w / total / bin_solid_angle;
            }
            // rounding may leave the sum short of one; close it at the last
            // occupied bin so no draw falls into an empty trailing bin
            if let Some(last) = weights.iter().rposition(|w| *w > 0.0) {
                density.cdf[last..].iter_mut().for_each(|c| *c = 1.0);
            }
        } else {
            density.cosine_mix = 1.0;
        }
        density
    }

    pub fn with_defaults(normal: &Vector3f, entries: &[(Vector3f, Float)]) -> Self {
        Self::new(normal, entries, DEFAULT_THETA_BINS, DEFAULT_PHI_BINS, DEFAULT_COSINE_MIX)
    }

    fn bin_index(local: &Vector3f, theta_bins: usize, phi_bins: usize) -> Option<usize> {
        let norm = local.norm();
        if !(norm > 0.0) {
            return None;
        }
        let z = local.z / norm;
        if !(z > 0.0) {
            return None;
        }
        let mut phi = local.y.atan2(local.x);
        if phi < 0.0 {
            phi += TWO_PI;
        }
        let it = ((z * theta_bins as Float) as usize).min(theta_bins - 1);
        let ip = ((phi / TWO_PI * phi_bins as Float) as usize).min(phi_bins - 1);
        Some(it * phi_bins + ip)
    }

    pub fn is_cosine_only(&self) -> bool {
        self.cdf.is_empty()
    }

    pub fn normal(&self) -> Vector3f {
        self.frame.z
    }

    /// Per-bin solid-angle density of the histogram part, row-major in
    /// `(theta, phi)` with theta rows ordered by increasing `cos(theta)`.
    pub fn bin_pdfs(&self) -> &[Float] {
        &self.bin_pdf
    }

    pub fn theta_bins(&self) -> usize {
        self.theta_bins
    }

    pub fn phi_bins(&self) -> usize {
        self.phi_bins
    }

    /// World-space direction drawn from the mixture.
    pub fn sample(&self, rng: &mut LcgRng) -> Vector3f {
        let choice = rng.next_f32();
        let u = rng.next_2d();
        if choice < self.cosine_mix || self.cdf.is_empty() {
            return self.frame.to_world(&sample_cosine_hemisphere(&u));
        }

        let idx = self.pick_bin(u.x);
        let (it, ip) = (idx / self.phi_bins, idx % self.phi_bins);
        let z = ((it as Float + u.y) / self.theta_bins as Float).min(1.0);
        let phi = (ip as Float + rng.next_f32()) / self.phi_bins as Float * TWO_PI;
        let r = (1.0 - z * z).max(0.0).sqrt();
        self.frame.to_world(&Vector3f::new(r * phi.cos(), r * phi.sin(), z))
    }

    fn pick_bin(&self, u: Float) -> usize {
        self.cdf.partition_point(|c| *c <= u).min(self.cdf.len() - 1)
    }

    /// Solid-angle pdf of `dir` under the mixture.
    pub fn pdf(&self, dir: &Vector3f) -> Float {
        let local = self.frame.to_local(dir);
        if !(local.z > 0.0) {
            return 0.0;
        }
        let cosine = sample_cosine_hemisphere_pdf(local.z / local.norm());
        if self.cdf.is_empty() {
            return cosine;
        }
        let histogram = Self::bin_index(&local, self.theta_bins, self.phi_bins)
            .map(|idx| self.bin_pdf[idx])
            .unwrap_or(0.0);
        self.cosine_mix * cosine + (1.0 - self.cosine_mix) * histogram
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "normal": [self.frame.z.x, self.frame.z.y, self.frame.z.z],
            "theta_bins": self.theta_bins,
            "phi_bins": self.phi_bins,
            "cosine_mix": self.cosine_mix,
            "bin_pdf": self.bin_pdf,
            "cosine_peak_pdf": INV_PI,
        })
    }
}
