// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{ BytesStart, Event };
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

use crate::core::scene::{ MaterialId, MediumId, Scene, SceneObject };
use crate::core::shape::Shape;
use crate::emitters::envmap::EnvironmentLight;
use crate::integrators::depositer::{ DEFAULT_PHOTON_BOUNCES, DEFAULT_PHOTON_COUNT, DEFAULT_SEARCH_COUNT };
use crate::integrators::optimal_mis::DEFAULT_PREPROCESS_SAMPLES;
use crate::integrators::IntegratorKind;
use crate::io::ImageError;
use crate::materials::glass::{ Glass, DEFAULT_GLASS_IOR };
use crate::materials::lambertian::Lambertian;
use crate::materials::mirror::Mirror;
use crate::materials::perfect_transmission::PerfectTransmission;
use crate::materials::phong::Phong;
use crate::materials::Material;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::media::homogeneous::HomogeneousMedium;
use crate::media::MediumModel;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;
use crate::shapes::triangle::Triangle;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scene XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("<{element}> is missing `{field}`")]
    MissingField { element: String, field: String },
    #[error("invalid value `{value}` for `{field}`")]
    InvalidValue { field: String, value: String },
    #[error("reference to unknown id `{0}`")]
    UnknownReference(String),
    #[error("unsupported {element} type `{kind}`")]
    UnknownType { element: String, kind: String },
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Everything outside the scene itself that drives a render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSettings {
    pub integrator: IntegratorKind,
    pub min_bounces: u32,
    pub max_bounces: u32,
    pub photon_count: usize,
    pub photon_bounces: u32,
    pub search_count: usize,
    pub preprocess_samples: u32,
    pub spp: u32,
    pub seed: u64,
    /// Worker threads; zero picks the available parallelism.
    pub threads: usize,
    /// Passes between checkpoint images; zero disables checkpoints.
    pub checkpoint_interval: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            integrator: IntegratorKind::Path,
            min_bounces: 1,
            max_bounces: 5,
            photon_count: DEFAULT_PHOTON_COUNT,
            photon_bounces: DEFAULT_PHOTON_BOUNCES,
            search_count: DEFAULT_SEARCH_COUNT,
            preprocess_samples: DEFAULT_PREPROCESS_SAMPLES,
            spp: 16,
            seed: 0,
            threads: 0,
            checkpoint_interval: 0,
        }
    }
}

pub struct SceneLoadResult {
    pub scene: Scene,
    pub settings: RenderSettings,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let result = parse_scene(&xml, base_dir)?;
    log::info!("Loaded {} with {} objects and {} lights.",
               path.display(), result.scene.len(), result.scene.lights().len());
    Ok(result)
}

/// Parse a scene from memory. Relative file names resolve against the
/// working directory.
pub fn load_scene_from_str(xml: &str) -> Result<SceneLoadResult, SceneLoadError> {
    parse_scene(xml, Path::new("."))
}

#[derive(Debug, Default)]
struct XmlNode {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|v| v.as_str())
    }

    fn required(&self, key: &str) -> Result<&str, SceneLoadError> {
        self.attr(key).ok_or_else(|| SceneLoadError::MissingField {
            element: self.tag.clone(),
            field: key.to_string(),
        })
    }

    /// Child property such as `<float name="radius" value="1"/>`.
    fn property(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.attr("name") == Some(name) && c.attr("value").is_some())
    }

    fn property_value(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(|c| c.attr("value"))
    }

    fn float(&self, name: &str, default: Float) -> Result<Float, SceneLoadError> {
        self.property_value(name).map_or(Ok(default), |v| parse_float(name, v))
    }

    fn u32(&self, name: &str, default: u32) -> Result<u32, SceneLoadError> {
        self.property_value(name).map_or(Ok(default), |v| parse_u32(name, v))
    }

    fn usize(&self, name: &str, default: usize) -> Result<usize, SceneLoadError> {
        self.property_value(name).map_or(Ok(default), |v| parse_usize(name, v))
    }

    fn vec3(&self, name: &str) -> Result<Vector3f, SceneLoadError> {
        let value = self.property_value(name).ok_or_else(|| SceneLoadError::MissingField {
            element: self.tag.clone(),
            field: name.to_string(),
        })?;
        parse_vec3(name, value)
    }

    /// `<rgb>` triple or a single grey value.
    fn spectrum(&self, name: &str, default: RGBSpectrum) -> Result<RGBSpectrum, SceneLoadError> {
        match self.property_value(name) {
            Some(value) => parse_spectrum(name, value),
            None => Ok(default),
        }
    }

    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

fn read_node(e: &BytesStart<'_>, defaults: &HashMap<String, String>) -> Result<XmlNode, SceneLoadError> {
    let mut node = XmlNode {
        tag: String::from_utf8_lossy(e.name().as_ref()).to_string(),
        ..XmlNode::default()
    };
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?;
        node.attrs.insert(key, resolve_value(&value, defaults));
    }
    Ok(node)
}

fn read_tree(xml: &str) -> Result<XmlNode, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut stack: Vec<XmlNode> = vec![XmlNode { tag: String::from("#document"), ..XmlNode::default() }];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                let node = read_node(&e, &defaults)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = read_node(&e, &defaults)?;
                if node.tag == "default" {
                    if let (Some(k), Some(v)) = (node.attr("name"), node.attr("value")) {
                        defaults.insert(k.to_string(), v.to_string());
                    }
                }
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }

    let mut document = stack.swap_remove(0);
    let scene = document.children
        .drain(..)
        .find(|c| c.tag == "scene")
        .ok_or_else(|| SceneLoadError::MissingField { element: String::from("document"), field: String::from("scene") });
    scene
}

fn parse_scene(xml: &str, base_dir: &Path) -> Result<SceneLoadResult, SceneLoadError> {
    let root = read_tree(xml)?;
    let mut scene = Scene::new();
    let mut settings = RenderSettings::default();

    let mut materials: HashMap<String, MaterialId> = HashMap::new();
    let mut media: HashMap<String, MediumId> = HashMap::new();

    for node in &root.children {
        match node.tag.as_str() {
            "integrator" => parse_integrator(node, &mut settings)?,
            "sensor" => parse_sensor(node, &mut scene, &mut settings)?,
            "bsdf" => {
                let id = node.required("id")?.to_string();
                let material = parse_bsdf(node)?;
                materials.insert(id, scene.add_material(material));
            }
            "medium" => {
                let id = node.required("id")?.to_string();
                let medium = parse_medium(node)?;
                media.insert(id, scene.add_medium(medium));
            }
            "shape" => {
                let object = parse_shape(node, &mut scene, &materials, &media)?;
                scene.add_object(object);
            }
            "emitter" => parse_environment(node, &mut scene, base_dir)?,
            "default" => {}
            other => log::warn!("Ignoring unknown scene element <{}>.", other),
        }
    }

    if scene.sensors().is_empty() {
        return Err(SceneLoadError::MissingField { element: String::from("scene"), field: String::from("sensor") });
    }

    Ok(SceneLoadResult { scene, settings })
}

fn parse_integrator(node: &XmlNode, settings: &mut RenderSettings) -> Result<(), SceneLoadError> {
    let kind = node.required("type")?;
    settings.integrator = kind.parse().map_err(|_| SceneLoadError::UnknownType {
        element: String::from("integrator"),
        kind: kind.to_string(),
    })?;
    settings.min_bounces = node.u32("min_bounces", settings.min_bounces)?;
    settings.max_bounces = node.u32("max_bounces", node.u32("max_depth", settings.max_bounces)?)?;
    settings.photon_count = node.usize("photon_count", settings.photon_count)?;
    settings.photon_bounces = node.u32("photon_bounces", settings.photon_bounces)?;
    settings.search_count = node.usize("search_count", settings.search_count)?;
    settings.preprocess_samples = node.u32("preprocess_samples", settings.preprocess_samples)?;
    settings.seed = node.usize("seed", settings.seed as usize)? as u64;
    Ok(())
}

fn parse_sensor(node: &XmlNode, scene: &mut Scene, settings: &mut RenderSettings) -> Result<(), SceneLoadError> {
    let kind = node.required("type")?;
    if kind != "perspective" {
        return Err(SceneLoadError::UnknownType { element: String::from("sensor"), kind: kind.to_string() });
    }

    let fov_deg = node.float("fov", 45.0)?;
    let lookat = node.children_named("transform")
        .filter(|t| t.attr("name") == Some("to_world"))
        .flat_map(|t| t.children_named("lookat"))
        .next()
        .ok_or_else(|| SceneLoadError::MissingField { element: String::from("sensor"), field: String::from("lookat") })?;
    let origin = parse_vec3("origin", lookat.required("origin")?)?;
    let target = parse_vec3("target", lookat.required("target")?)?;
    let up = match lookat.attr("up") {
        Some(up) => parse_vec3("up", up)?,
        None => Vector3f::new(0.0, 1.0, 0.0),
    };

    let (mut width, mut height) = (512, 512);
    if let Some(film) = node.children_named("film").next() {
        width = film.usize("width", width)?;
        height = film.usize("height", height)?;
        settings.spp = film.u32("spp", film.u32("sample_count", settings.spp)?)?;
    }
    if width == 0 || height == 0 {
        return Err(SceneLoadError::InvalidValue {
            field: String::from("film"),
            value: format!("{}x{}", width, height),
        });
    }

    scene.add_sensor(Box::new(PerspectiveCamera::new(origin, target, up, fov_deg.to_radians(), width, height)));
    Ok(())
}

fn parse_bsdf(node: &XmlNode) -> Result<Material, SceneLoadError> {
    let kind = node.required("type")?;
    let material = match kind {
        "diffuse" => Material::Lambertian(Lambertian::new(node.spectrum("reflectance", RGBSpectrum::splat(0.5))?)),
        "mirror" | "conductor" => Material::Mirror(Mirror::new(node.spectrum("reflectance", RGBSpectrum::ones())?)),
        "dielectric" => Material::Glass(Glass::new(node.float("ior", DEFAULT_GLASS_IOR)?)),
        "transmission" | "null" => Material::PerfectTransmission(PerfectTransmission::new()),
        "phong" => Material::Phong(Phong::new(node.spectrum("kd", RGBSpectrum::splat(0.5))?,
                                              node.spectrum("ks", RGBSpectrum::splat(0.2))?,
                                              node.float("exponent", 20.0)?)),
        other => return Err(SceneLoadError::UnknownType { element: String::from("bsdf"), kind: other.to_string() }),
    };
    Ok(material)
}

fn parse_medium(node: &XmlNode) -> Result<MediumModel, SceneLoadError> {
    match node.required("type")? {
        "homogeneous" => Ok(MediumModel::Homogeneous(HomogeneousMedium::new(
            node.spectrum("sigma_t", RGBSpectrum::ones())?,
            node.spectrum("albedo", RGBSpectrum::splat(0.8))?,
            node.float("g", 0.0)?,
        ))),
        "vacuum" => Ok(MediumModel::Vacuum),
        other => Err(SceneLoadError::UnknownType { element: String::from("medium"), kind: other.to_string() }),
    }
}

fn parse_shape(node: &XmlNode,
               scene: &mut Scene,
               materials: &HashMap<String, MaterialId>,
               media: &HashMap<String, MediumId>) -> Result<SceneObject, SceneLoadError> {
    let shape: Box<dyn Shape> = match node.required("type")? {
        "sphere" => Box::new(Sphere::new(node.vec3("center")?, node.float("radius", 1.0)?)),
        "rectangle" => Box::new(Rectangle::new(node.vec3("center")?, node.vec3("u")?, node.vec3("v")?)),
        "triangle" => Box::new(Triangle::new(node.vec3("p0")?, node.vec3("p1")?, node.vec3("p2")?)),
        other => return Err(SceneLoadError::UnknownType { element: String::from("shape"), kind: other.to_string() }),
    };

    let mut material = None;
    let mut interior = None;
    for r in node.children_named("ref") {
        let id = r.required("id")?;
        match r.attr("name") {
            Some("interior") => {
                interior = Some(*media.get(id).ok_or_else(|| SceneLoadError::UnknownReference(id.to_string()))?);
            }
            _ => {
                material = Some(*materials.get(id).ok_or_else(|| SceneLoadError::UnknownReference(id.to_string()))?);
            }
        }
    }
    // an inline <bsdf> takes the place of a reference
    if let Some(inline) = node.children_named("bsdf").next() {
        material = Some(scene.add_material(parse_bsdf(inline)?));
    }
    let material = material.ok_or_else(|| SceneLoadError::MissingField {
        element: String::from("shape"),
        field: String::from("bsdf"),
    })?;

    let mut object = SceneObject::new(shape, material).with_interior_medium(interior);
    if let Some(id) = node.attr("id") {
        object = object.with_name(id.to_string());
    }
    if let Some(emitter) = node.children_named("emitter").next() {
        match emitter.required("type")? {
            "area" => object = object.with_emission(emitter.spectrum("radiance", RGBSpectrum::ones())?),
            other => return Err(SceneLoadError::UnknownType { element: String::from("emitter"), kind: other.to_string() }),
        }
    }
    Ok(object)
}

fn parse_environment(node: &XmlNode, scene: &mut Scene, base_dir: &Path) -> Result<(), SceneLoadError> {
    let kind = node.required("type")?;
    if kind != "envmap" && kind != "constant" {
        return Err(SceneLoadError::UnknownType { element: String::from("emitter"), kind: kind.to_string() });
    }

    let environment = match node.property_value("filename") {
        Some(filename) => {
            let path = if Path::new(filename).is_absolute() {
                filename.to_string()
            } else {
                base_dir.join(filename).to_string_lossy().to_string()
            };
            EnvironmentLight::from_file(&path, node.spectrum("scale", RGBSpectrum::ones())?)?
        }
        None => EnvironmentLight::constant(node.spectrum("radiance", RGBSpectrum::ones())?),
    };
    scene.set_environment(environment);
    Ok(())
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn invalid(field: &str, value: &str) -> SceneLoadError {
    SceneLoadError::InvalidValue { field: field.to_string(), value: value.to_string() }
}

fn parse_float(field: &str, value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| invalid(field, value))
}

fn parse_u32(field: &str, value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>().map_err(|_| invalid(field, value))
}

fn parse_usize(field: &str, value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| invalid(field, value))
}

fn parse_vec3(field: &str, value: &str) -> Result<Vector3f, SceneLoadError> {
    let parts: Vec<&str> = value.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(invalid(field, value));
    }
    Ok(Vector3f::new(parse_float(field, parts[0])?,
                     parse_float(field, parts[1])?,
                     parse_float(field, parts[2])?))
}

fn parse_spectrum(field: &str, value: &str) -> Result<RGBSpectrum, SceneLoadError> {
    if let Ok(grey) = value.trim().parse::<Float>() {
        return Ok(RGBSpectrum::splat(grey));
    }
    Ok(RGBSpectrum::from(parse_vec3(field, value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emitter::Emitter;

    const CORNER: &str = r#"
        <scene>
            <default name="spp" value="8"/>
            <integrator type="depositer">
                <integer name="max_bounces" value="4"/>
                <integer name="photon_count" value="1000"/>
                <integer name="search_count" value="32"/>
            </integrator>
            <sensor type="perspective">
                <float name="fov" value="40"/>
                <transform name="to_world">
                    <lookat origin="0, 1, 5" target="0, 1, 0" up="0, 1, 0"/>
                </transform>
                <film>
                    <integer name="width" value="32"/>
                    <integer name="height" value="24"/>
                    <integer name="spp" value="$spp"/>
                </film>
            </sensor>
            <bsdf type="diffuse" id="white">
                <rgb name="reflectance" value="0.8, 0.8, 0.8"/>
            </bsdf>
            <bsdf type="dielectric" id="glass">
                <float name="ior" value="1.33"/>
            </bsdf>
            <medium type="homogeneous" id="fog">
                <rgb name="sigma_t" value="0.5"/>
                <rgb name="albedo" value="0.9, 0.9, 0.9"/>
            </medium>
            <shape type="rectangle" id="floor">
                <point name="center" value="0, 0, 0"/>
                <vector name="u" value="0, 0, 10"/>
                <vector name="v" value="10, 0, 0"/>
                <ref id="white"/>
            </shape>
            <shape type="sphere" id="ball">
                <point name="center" value="0, 1, 0"/>
                <float name="radius" value="0.5"/>
                <ref id="glass"/>
                <ref name="interior" id="fog"/>
            </shape>
            <shape type="sphere" id="lamp">
                <point name="center" value="0, 4, 0"/>
                <float name="radius" value="0.25"/>
                <bsdf type="diffuse"/>
                <emitter type="area">
                    <rgb name="radiance" value="10, 9, 8"/>
                </emitter>
            </shape>
            <emitter type="envmap">
                <rgb name="radiance" value="0.1"/>
            </emitter>
        </scene>
    "#;

    #[test]
    fn test_load_full_scene() {
        let result = load_scene_from_str(CORNER).expect("scene should parse");
        let settings = &result.settings;
        assert_eq!(settings.integrator, IntegratorKind::Depositer);
        assert_eq!(settings.max_bounces, 4);
        assert_eq!(settings.min_bounces, 1);
        assert_eq!(settings.photon_count, 1000);
        assert_eq!(settings.search_count, 32);
        assert_eq!(settings.spp, 8);

        let scene = &result.scene;
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.lights().len(), 2);
        assert!(scene.environment().is_some());
        assert_eq!(scene.sensors().len(), 1);
        assert_eq!(scene.sensors()[0].width(), 32);
        assert_eq!(scene.sensors()[0].height(), 24);

        let lamp = scene.light_for_object(crate::core::scene::ObjectId(2)).expect("lamp is an emitter");
        assert_eq!(scene.light(lamp).radiance(), RGBSpectrum::new(10.0, 9.0, 8.0));
        assert!(scene.interior_medium(crate::core::scene::ObjectId(1)).is_some());
        assert!(scene.interior_medium(crate::core::scene::ObjectId(0)).is_none());
    }

    #[test]
    fn test_unknown_reference() {
        let xml = CORNER.replace(r#"<ref id="white"/>"#, r#"<ref id="black"/>"#);
        match load_scene_from_str(&xml) {
            Err(SceneLoadError::UnknownReference(id)) => assert_eq!(id, "black"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.settings)),
        }
    }

    #[test]
    fn test_unknown_types_and_values() {
        let xml = CORNER.replace(r#"type="depositer""#, r#"type="bdpt""#);
        assert!(matches!(load_scene_from_str(&xml), Err(SceneLoadError::UnknownType { .. })));

        let xml = CORNER.replace(r#"value="0.5"/>"#, r#"value="0.5, x"/>"#);
        assert!(matches!(load_scene_from_str(&xml), Err(SceneLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_sensor() {
        let xml = r#"<scene><bsdf type="diffuse" id="a"/></scene>"#;
        assert!(matches!(load_scene_from_str(xml), Err(SceneLoadError::MissingField { .. })));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(load_scene_from_str("<scene><sensor></scene>").is_err());
    }
}
