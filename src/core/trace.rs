// Copyright @yucwang 2026

use crate::math::constants::Vector3f;

#[derive(Debug, Copy, Clone)]
pub struct ShadowTest {
    pub shading_point: Vector3f,
    pub light_point: Vector3f,
    pub occluded: bool,
}

/// Debug record of one integrator invocation. Append-only while the
/// integrator runs, read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct SampleTrace {
    pixel: Option<(usize, usize)>,
    eye_points: Vec<Vector3f>,
    shadow_tests: Vec<ShadowTest>,
}

impl SampleTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_pixel(x: usize, y: usize) -> Self {
        Self { pixel: Some((x, y)), ..Self::default() }
    }

    /// Reuse the allocation for the next sample of `pixel`.
    pub fn reset(&mut self, pixel: Option<(usize, usize)>) {
        self.pixel = pixel;
        self.eye_points.clear();
        self.shadow_tests.clear();
    }

    pub fn pixel(&self) -> Option<(usize, usize)> {
        self.pixel
    }

    pub fn push_eye_point(&mut self, p: Vector3f) {
        self.eye_points.push(p);
    }

    pub fn push_shadow_test(&mut self, shading_point: Vector3f, light_point: Vector3f, occluded: bool) {
        self.shadow_tests.push(ShadowTest { shading_point, light_point, occluded });
    }

    pub fn eye_points(&self) -> &[Vector3f] {
        &self.eye_points
    }

    pub fn shadow_tests(&self) -> &[ShadowTest] {
        &self.shadow_tests
    }

    pub fn to_json(&self) -> serde_json::Value {
        let eye: Vec<[f32; 3]> = self.eye_points.iter().map(|p| [p.x, p.y, p.z]).collect();
        let shadows: Vec<serde_json::Value> = self.shadow_tests.iter().map(|s| {
            serde_json::json!({
                "shading_point": [s.shading_point.x, s.shading_point.y, s.shading_point.z],
                "light_point": [s.light_point.x, s.light_point.y, s.light_point.z],
                "occluded": s.occluded,
            })
        }).collect();
        serde_json::json!({
            "pixel": self.pixel,
            "eye_points": eye,
            "shadow_tests": shadows,
        })
    }
}
