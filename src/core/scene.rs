// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, LightSample};
use crate::core::interaction::SurfaceIntersection;
use crate::core::medium::Medium;
use crate::core::rng::LcgRng;
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::emitters::area::AreaLight;
use crate::emitters::envmap::EnvironmentLight;
use crate::emitters::Light;
use crate::materials::Material;
use crate::media::MediumModel;
use crate::math::constants::{ EPSILON, Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::collections::HashMap;

/// Maximum number of pass-through boundaries a shadow segment may cross.
const MAX_SHADOW_CROSSINGS: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MediumId(pub usize);

pub struct SceneObject {
    pub shape: Box<dyn Shape>,
    pub material: MaterialId,
    pub emission: RGBSpectrum,
    pub name: Option<String>,
    pub interior_medium: Option<MediumId>,
}

impl SceneObject {
    pub fn new(shape: Box<dyn Shape>, material: MaterialId) -> Self {
        Self { shape, material, emission: RGBSpectrum::default(), name: None, interior_medium: None }
    }

    pub fn with_emission(mut self, emission: RGBSpectrum) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_interior_medium(mut self, medium: Option<MediumId>) -> Self {
        self.interior_medium = medium;
        self
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }
}

/// Scene arenas. Objects reference materials and media by handle; area
/// lights reference their object the same way.
pub struct Scene {
    objects: Vec<SceneObject>,
    materials: Vec<Material>,
    media: Vec<MediumModel>,
    lights: Vec<Light>,
    object_lights: HashMap<usize, usize>,
    environment: Option<usize>,
    sensors: Vec<Box<dyn Sensor>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            materials: Vec::new(),
            media: Vec::new(),
            lights: Vec::new(),
            object_lights: HashMap::new(),
            environment: None,
            sensors: Vec::new(),
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_medium(&mut self, medium: MediumModel) -> MediumId {
        self.media.push(medium);
        MediumId(self.media.len() - 1)
    }

    /// Emissive objects also register an area light pointing back at them.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        assert!(object.material.0 < self.materials.len(), "object references unknown material {}", object.material.0);
        let id = ObjectId(self.objects.len());
        let emission = object.emission;
        self.objects.push(object);
        if !emission.is_black() {
            self.object_lights.insert(id.0, self.lights.len());
            self.lights.push(Light::Area(AreaLight::new(id, emission)));
        }
        id
    }

    pub fn set_environment(&mut self, environment: EnvironmentLight) {
        match self.environment {
            Some(idx) => self.lights[idx] = Light::Environment(environment),
            None => {
                self.environment = Some(self.lights.len());
                self.lights.push(Light::Environment(environment));
            }
        }
    }

    pub fn add_sensor(&mut self, sensor: Box<dyn Sensor>) {
        self.sensors.push(sensor);
    }

    pub fn sensor(&self, id: usize) -> Option<&dyn Sensor> {
        self.sensors.get(id).map(|s| s.as_ref())
    }

    pub fn sensors(&self) -> &[Box<dyn Sensor>] {
        &self.sensors
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn medium(&self, id: MediumId) -> &MediumModel {
        &self.media[id.0]
    }

    /// Medium enclosed by the object, `None` when its inside is vacuum.
    pub fn interior_medium(&self, id: ObjectId) -> Option<&dyn Medium> {
        self.objects[id.0].interior_medium.map(|m| &self.media[m.0] as &dyn Medium)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light(&self, idx: usize) -> &Light {
        &self.lights[idx]
    }

    pub fn light_for_object(&self, id: ObjectId) -> Option<usize> {
        self.object_lights.get(&id.0).copied()
    }

    pub fn environment(&self) -> Option<&Light> {
        self.environment.map(|idx| &self.lights[idx])
    }

    /// Radiance arriving along `-dir` from the environment, zero without one.
    pub fn environment_radiance(&self, dir: &Vector3f) -> RGBSpectrum {
        match self.environment() {
            Some(Light::Environment(env)) => env.radiance_from(dir),
            _ => RGBSpectrum::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Closest hit along `ray` inside its `[min_t, max_t]` range.
    pub fn test_intersect(&self, ray: &Ray3f) -> Option<SurfaceIntersection<'_>> {
        let mut clipped = *ray;
        let mut closest = None;
        for (idx, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.shape.ray_intersection(&clipped) {
                clipped.max_t = hit.t;
                closest = Some((idx, hit));
            }
        }

        closest.map(|(idx, hit)| {
            let object = &self.objects[idx];
            SurfaceIntersection::new(hit.t,
                                     hit.p,
                                     hit.geo_normal,
                                     hit.sh_normal,
                                     -ray.dir(),
                                     object.emission,
                                     ObjectId(idx),
                                     &self.materials[object.material.0])
        })
    }

    /// Whether anything blocks `ray` before `max_distance`.
    pub fn test_occlusion(&self, ray: &Ray3f, max_distance: Float) -> bool {
        let mut clipped = *ray;
        clipped.max_t = clipped.max_t.min(max_distance);
        self.objects.iter().any(|object| object.shape.ray_intersection_t(&clipped))
    }

    /// Transmittance of the segment `from -> to` starting in `medium`.
    /// Pass-through boundaries switch the active medium; any other surface
    /// blocks the segment.
    pub fn shadow_transmittance(&self, from: &Vector3f, to: &Vector3f, medium: Option<&dyn Medium>) -> RGBSpectrum {
        let mut transmittance = RGBSpectrum::ones();
        let mut current = *from;
        let mut active = medium;

        for _ in 0..MAX_SHADOW_CROSSINGS {
            let to_target = to - current;
            let dist = to_target.norm();
            if dist <= EPSILON {
                return transmittance;
            }
            let dir = to_target / dist;
            let ray = Ray3f::new(current, dir, Some(EPSILON), Some(dist - EPSILON));
            let its = match self.test_intersect(&ray) {
                None => {
                    if let Some(m) = active {
                        transmittance *= m.transmittance(&current, to);
                    }
                    return transmittance;
                }
                Some(its) => its,
            };

            if !its.material().is_passthrough() {
                return RGBSpectrum::default();
            }
            if let Some(m) = active {
                transmittance *= m.transmittance(&current, &its.p());
                if transmittance.is_black() {
                    return transmittance;
                }
            }
            active = if dir.dot(&its.geo_normal()) < 0.0 {
                self.interior_medium(its.object())
            } else {
                None
            };
            current = its.p();
        }

        RGBSpectrum::default()
    }

    /// Pick one light uniformly and sample it. The selection probability is
    /// folded into `inv_pdf`.
    pub fn sample_direct_lights(&self, reference: &Vector3f, rng: &mut LcgRng) -> Option<LightSample> {
        if self.lights.is_empty() {
            return None;
        }
        let count = self.lights.len();
        let idx = ((rng.next_f32() * count as Float) as usize).min(count - 1);
        let u = rng.next_2d();
        let sample = self.lights[idx].sample(self, reference, &u)?;
        Some(LightSample {
            light: idx,
            point: sample.point,
            normal: sample.normal,
            inv_pdf: sample.inv_pdf * count as Float,
            measure: sample.measure,
        })
    }

    /// Solid-angle density with which `sample_direct_lights` at `reference`
    /// would have produced the emitter point `hit`.
    pub fn lights_pdf(&self, reference: &Vector3f, hit: &SurfaceIntersection<'_>) -> Float {
        let light_idx = match self.light_for_object(hit.object()) {
            Some(idx) => idx,
            None => return 0.0,
        };
        let area = self.objects[hit.object().0].shape.surface_area();
        if area <= 0.0 {
            return 0.0;
        }
        let to_light = hit.p() - reference;
        let dist2 = to_light.norm_squared();
        if dist2 <= 0.0 {
            return 0.0;
        }
        let cos_light = hit.geo_normal().dot(&(to_light / dist2.sqrt())).abs();
        if cos_light <= 0.0 {
            return 0.0;
        }
        debug_assert!(matches!(self.lights[light_idx], Light::Area(_)));
        dist2 / (cos_light * area * self.lights.len() as Float)
    }

    /// Solid-angle density of sampling the environment along `dir`.
    pub fn environment_pdf(&self, dir: &Vector3f) -> Float {
        match self.environment() {
            Some(light) => light.direction_pdf(dir) / self.lights.len() as Float,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::lambertian::Lambertian;
    use crate::materials::perfect_transmission::PerfectTransmission;
    use crate::media::homogeneous::HomogeneousMedium;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;

    fn two_sphere_scene() -> Scene {
        let mut scene = Scene::new();
        let diffuse = scene.add_material(Material::Lambertian(Lambertian::new(RGBSpectrum::splat(0.5))));
        scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0)), diffuse));
        scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 10.0), 1.0)), diffuse)
            .with_emission(RGBSpectrum::splat(2.0)));
        scene
    }

    #[test]
    fn test_closest_hit_wins() {
        let scene = two_sphere_scene();
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let its = scene.test_intersect(&ray).expect("ray should hit");
        assert_eq!(its.object(), ObjectId(0));
        assert!((its.t() - 4.0).abs() < 1e-4);
        assert!((its.wo() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-6);
        assert!(!its.is_emitter());

        let miss = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), None, None);
        assert!(scene.test_intersect(&miss).is_none());
    }

    #[test]
    fn test_emissive_object_registers_light() {
        let scene = two_sphere_scene();
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.light_for_object(ObjectId(1)), Some(0));
        assert_eq!(scene.light_for_object(ObjectId(0)), None);
    }

    #[test]
    fn test_occlusion_respects_distance() {
        let scene = two_sphere_scene();
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(scene.test_occlusion(&ray, 100.0));
        assert!(!scene.test_occlusion(&ray, 3.5));
    }

    #[test]
    fn test_lights_pdf_matches_sampling_density() {
        let mut scene = Scene::new();
        let diffuse = scene.add_material(Material::Lambertian(Lambertian::new(RGBSpectrum::splat(0.5))));
        // 2x2 rectangle at z = 3 facing -z
        let rect = Rectangle::new(Vector3f::new(0.0, 0.0, 3.0),
                                  Vector3f::new(0.0, 2.0, 0.0),
                                  Vector3f::new(2.0, 0.0, 0.0));
        scene.add_object(SceneObject::new(Box::new(rect), diffuse).with_emission(RGBSpectrum::ones()));
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let its = scene.test_intersect(&ray).expect("ray should hit the light");
        let pdf = scene.lights_pdf(&Vector3f::zeros(), &its);
        assert!((pdf - 9.0 / 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_shadow_transmittance_through_boundary() {
        let mut scene = Scene::new();
        let pass = scene.add_material(Material::PerfectTransmission(PerfectTransmission::new()));
        let fog = scene.add_medium(MediumModel::Homogeneous(HomogeneousMedium::new(
            RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.0), 0.0)));
        scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::zeros(), 1.0)), pass)
            .with_interior_medium(Some(fog)));

        let from = Vector3f::new(0.0, 0.0, -3.0);
        let to = Vector3f::new(0.0, 0.0, 3.0);
        let tr = scene.shadow_transmittance(&from, &to, None);
        let expected = (-0.5f32 * 2.0).exp();
        assert!((tr.r() - expected).abs() < 1e-3);

        let diffuse = scene.add_material(Material::Lambertian(Lambertian::new(RGBSpectrum::splat(0.5))));
        scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, 2.0), 0.5)), diffuse));
        assert!(scene.shadow_transmittance(&from, &to, None).is_black());
    }
}
