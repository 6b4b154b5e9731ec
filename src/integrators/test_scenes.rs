// Copyright @yucwang 2026

//! Small analytic scenes shared by the integrator tests.

use crate::core::interaction::SurfaceIntersection;
use crate::core::scene::{ Scene, SceneObject };
use crate::materials::lambertian::Lambertian;
use crate::materials::Material;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;

pub struct Fixture {
    pub scene: Scene,
    pub query: Ray3f,
}

impl Fixture {
    pub fn query_hit(&self) -> SurfaceIntersection<'_> {
        self.scene.test_intersect(&self.query).expect("query ray must hit the scene")
    }
}

/// Outgoing radiance of a Lambertian plane directly below a sphere light:
/// `albedo * Le * (R / h)^2`.
pub fn sphere_light_radiance(albedo: Float, le: Float, radius: Float, height: Float) -> Float {
    albedo * le * (radius / height).powi(2)
}

pub fn diffuse(scene: &mut Scene, albedo: Float) -> crate::core::scene::MaterialId {
    scene.add_material(Material::Lambertian(Lambertian::new(RGBSpectrum::splat(albedo))))
}

pub fn floor() -> Box<Rectangle> {
    Box::new(Rectangle::new(Vector3f::zeros(),
                            Vector3f::new(100.0, 0.0, 0.0),
                            Vector3f::new(0.0, 100.0, 0.0)))
}

/// Large diffuse floor at z = 0 and an emissive sphere centred at height `h`
/// above the origin. The query ray lands on the origin.
pub fn plane_under_sphere_light(albedo: Float, le: Float, radius: Float, height: Float) -> Fixture {
    let mut scene = Scene::new();
    let floor_material = diffuse(&mut scene, albedo);
    let black = diffuse(&mut scene, 0.0);
    scene.add_object(SceneObject::new(floor(), floor_material).with_name(String::from("floor")));
    scene.add_object(SceneObject::new(Box::new(Sphere::new(Vector3f::new(0.0, 0.0, height), radius)), black)
        .with_emission(RGBSpectrum::splat(le))
        .with_name(String::from("light")));

    let origin = Vector3f::new(2.0, 0.0, 1.0);
    let query = Ray3f::new(origin, -origin, None, None);
    Fixture { scene, query }
}
