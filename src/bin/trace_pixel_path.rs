use depositer::core::rng::LcgRng;
use depositer::core::scene_loader::load_scene;
use depositer::core::trace::SampleTrace;
use depositer::integrators::{ build_integrator, IntegratorKind };
use depositer::math::constants::{ Float, Vector2f };
use std::env;
use std::fs;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--integrator NAME] [--max-bounces N] [--seed N] [--camera N] [--out debug.json]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x: usize = args[2].parse().unwrap_or(0);
    let y: usize = args[3].parse().unwrap_or(0);

    let loaded = match load_scene(scene_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let scene = loaded.scene;
    let mut settings = loaded.settings;
    let mut camera_id: usize = 0;
    let mut out_path = String::from("debug.json");

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--integrator" => {
                i += 1;
                if let Some(kind) = args.get(i).and_then(|v| v.parse::<IntegratorKind>().ok()) {
                    settings.integrator = kind;
                }
            }
            "--max-bounces" => {
                i += 1;
                settings.max_bounces = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(settings.max_bounces);
            }
            "--seed" => {
                i += 1;
                settings.seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(settings.seed);
            }
            "--camera" => {
                i += 1;
                camera_id = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(camera_id);
            }
            "--out" => {
                i += 1;
                if let Some(path) = args.get(i) {
                    out_path = path.clone();
                }
            }
            _ => {}
        }
        i += 1;
    }

    let sensor = match scene.sensor(camera_id) {
        Some(sensor) => sensor,
        None => {
            log::error!("camera {} not found", camera_id);
            std::process::exit(1);
        }
    };
    let (width, height) = (sensor.width(), sensor.height());
    if x >= width || y >= height {
        eprintln!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, width, height);
        std::process::exit(2);
    }

    let mut integrator = build_integrator(&settings);
    integrator.preprocess(&scene, sensor, &mut LcgRng::new(settings.seed));

    let mut rng = LcgRng::for_pixel(settings.seed, 0, x, y);
    let u = Vector2f::new((x as Float + 0.5) / width as Float, (y as Float + 0.5) / height as Float);
    let ray = sensor.sample_ray(&u);
    let mut trace = SampleTrace::for_pixel(x, y);
    let radiance = integrator.radiance(&ray, &scene, &mut rng, &mut trace);

    println!("Pixel ({}, {}) with {}", x, y, integrator.name());
    println!("Radiance: {:.6}, {:.6}, {:.6}", radiance.r(), radiance.g(), radiance.b());
    for (idx, p) in trace.eye_points().iter().enumerate() {
        println!("  eye[{}] = ({:.4}, {:.4}, {:.4})", idx, p.x, p.y, p.z);
    }
    for test in trace.shadow_tests() {
        println!("  shadow {:?}", test);
    }

    let its = match scene.test_intersect(&ray) {
        Some(its) => its,
        None => {
            println!("Primary ray misses the scene, no debug dump.");
            return;
        }
    };
    let dump = serde_json::json!({
        "pixel": [x, y],
        "settings": settings,
        "trace": trace.to_json(),
        "debug": integrator.debug(&its, &scene),
    });
    match serde_json::to_string_pretty(&dump) {
        Ok(text) => match fs::write(&out_path, text) {
            Ok(()) => println!("Debug dump written to {}", out_path),
            Err(e) => {
                log::error!("failed to write {}: {}", out_path, e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("failed to serialize debug dump: {}", e);
            std::process::exit(1);
        }
    }
}
