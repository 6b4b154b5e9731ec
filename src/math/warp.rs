// Copyright @yucwang 2023

use super::constants::{ INV_FOUR_PI, INV_PI, INV_TWO_PI, PI, TWO_PI, Float, Vector2f, Vector3f };

pub fn sample_uniform_hemisphere(u: &Vector2f) -> Vector3f {
    let z: Float = u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = TWO_PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1.0 - 2.0 * u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = TWO_PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    Vector3f::new(p.x, p.y, z)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta.max(0.0) * INV_PI
}

/// Barycentric coordinates uniformly distributed over a triangle.
pub fn sample_uniform_triangle(u: &Vector2f) -> Vector3f {
    let su = u.x.sqrt();
    let b0 = 1.0 - su;
    let b1 = u.y * su;
    Vector3f::new(b0, b1, 1.0 - b0 - b1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Vector2f> {
        let mut points = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                points.push(Vector2f::new((i as Float + 0.5) / n as Float,
                                          (j as Float + 0.5) / n as Float));
            }
        }
        points
    }

    #[test]
    fn test_hemisphere_samples_are_unit_and_upper() {
        for u in grid(16) {
            let d = sample_uniform_hemisphere(&u);
            assert!((d.norm() - 1.0).abs() < 1e-4);
            assert!(d.z >= 0.0);

            let c = sample_cosine_hemisphere(&u);
            assert!((c.norm() - 1.0).abs() < 1e-4);
            assert!(c.z >= 0.0);
        }
    }

    #[test]
    fn test_cosine_hemisphere_mean_cosine() {
        // E[cos] under cos/pi is 2/3.
        let samples = grid(64);
        let mean: Float = samples.iter()
            .map(|u| sample_cosine_hemisphere(u).z)
            .sum::<Float>() / samples.len() as Float;
        assert!((mean - 2.0 / 3.0).abs() < 1e-2);
    }

    #[test]
    fn test_uniform_sphere_is_balanced() {
        let samples = grid(32);
        let mean = samples.iter()
            .map(|u| sample_uniform_sphere(u))
            .fold(Vector3f::zeros(), |acc, d| acc + d) / samples.len() as Float;
        assert!(mean.norm() < 1e-2);
        assert!((sample_uniform_sphere_pdf() * 4.0 * PI - 1.0).abs() < 1e-6);
    }
}
