// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Pinhole camera. `fov_y_radians` is the full vertical field of view.
pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect: width as Float / height.max(1) as Float,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;
        let dir = self.right * px + self.up * py + self.forward;
        Ray3f::new(self.origin, dir, Some(0.0), None)
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera: {}x{} at ({}, {}, {})",
                self.width, self.height, self.origin.x, self.origin.y, self.origin.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 1.0, -5.0),
                                            Vector3f::new(0.0, 1.0, 0.0),
                                            Vector3f::new(0.0, 1.0, 0.0),
                                            0.8, 64, 32);
        let ray = camera.sample_ray(&Vector2f::new(0.5, 0.5));
        assert!((ray.dir() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-5);
        assert_eq!(ray.origin(), Vector3f::new(0.0, 1.0, -5.0));

        let top = camera.sample_ray(&Vector2f::new(0.5, 0.0));
        assert!(top.dir().y > 0.0);
    }

    #[test]
    fn test_field_of_view_edges() {
        let fov: Float = 1.0;
        let camera = PerspectiveCamera::new(Vector3f::zeros(),
                                            Vector3f::new(0.0, 0.0, 1.0),
                                            Vector3f::new(0.0, 1.0, 0.0),
                                            fov, 16, 16);
        let top = camera.sample_ray(&Vector2f::new(0.5, 0.0));
        let angle = top.dir().dot(&Vector3f::new(0.0, 0.0, 1.0)).acos();
        assert!((angle - 0.5 * fov).abs() < 1e-4);
    }
}
