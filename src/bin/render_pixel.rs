use depositer::core::rng::LcgRng;
use depositer::core::scene_loader::load_scene;
use depositer::core::trace::SampleTrace;
use depositer::integrators::{ build_integrator, IntegratorKind };
use depositer::math::constants::{ Float, Vector2f };
use depositer::math::spectrum::RGBSpectrum;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--spp N] [--integrator NAME] [--max-bounces N] [--seed N] [--camera N]", args[0]);
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
    let mut spp: u32 = 64;
    let mut camera_id: usize = 0;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(spp);
            }
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

    let mut sum = RGBSpectrum::default();
    let mut non_finite = 0;
    let mut trace = SampleTrace::for_pixel(x, y);
    for pass in 0..spp {
        let mut rng = LcgRng::for_pixel(settings.seed, pass, x, y);
        let u = Vector2f::new((x as Float + rng.next_f32()) / width as Float,
                              (y as Float + rng.next_f32()) / height as Float);
        trace.reset(Some((x, y)));
        let radiance = integrator.radiance(&sensor.sample_ray(&u), &scene, &mut rng, &mut trace);
        if radiance.is_finite() {
            sum += radiance;
        } else {
            non_finite += 1;
        }
    }

    let mean = sum / spp.max(1) as Float;
    println!("Pixel ({}, {}) with {} at {} spp", x, y, integrator.name(), spp);
    println!("Mean RGB: {:.6}, {:.6}, {:.6}", mean.r(), mean.g(), mean.b());
    if non_finite > 0 {
        println!("Non-finite samples: {}", non_finite);
    }
}
