// Copyright 2020 TwoCookingMice

use depositer::core::scene_loader::{ load_scene, RenderSettings };
use depositer::integrators::{ build_integrator, IntegratorKind };
use depositer::io::exr_utils;
use depositer::renderers::simple::{ RenderOptions, Renderer, SimpleRenderer };

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Offline Monte Carlo renderer")]
struct Args {
    /// Scene description (XML)
    scene: PathBuf,

    /// Output image (EXR)
    output: PathBuf,

    #[arg(long)]
    /// Samples per pixel, overrides the scene's film
    spp: Option<u32>,

    #[arg(long)]
    /// path, volpath, optimal_mis or depositer
    integrator: Option<IntegratorKind>,

    #[arg(long)]
    min_bounces: Option<u32>,

    #[arg(long)]
    max_bounces: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 0)]
    camera: usize,

    #[arg(long)]
    /// Worker threads, 0 for all cores
    threads: Option<usize>,

    #[arg(long)]
    /// Write a checkpoint image every N passes
    checkpoint_interval: Option<u32>,
}

impl Args {
    fn apply(&self, settings: &mut RenderSettings) {
        if let Some(spp) = self.spp {
            settings.spp = spp;
        }
        if let Some(kind) = self.integrator {
            settings.integrator = kind;
        }
        if let Some(min_bounces) = self.min_bounces {
            settings.min_bounces = min_bounces;
        }
        if let Some(max_bounces) = self.max_bounces {
            settings.max_bounces = max_bounces;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
        if let Some(interval) = self.checkpoint_interval {
            settings.checkpoint_interval = interval;
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let loaded = match load_scene(&args.scene) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let scene = loaded.scene;
    let mut settings = loaded.settings;
    args.apply(&mut settings);
    if settings.min_bounces > settings.max_bounces {
        log::warn!("min_bounces {} exceeds max_bounces {}, nothing will be counted.",
                   settings.min_bounces, settings.max_bounces);
    }

    let options = RenderOptions {
        camera_id: args.camera,
        spp: settings.spp,
        seed: settings.seed,
        threads: settings.threads,
        checkpoint_interval: settings.checkpoint_interval,
        output: Some(args.output.clone()),
    };
    let mut renderer = SimpleRenderer::new(build_integrator(&settings), options);
    let image = renderer.render(&scene);
    if image.width() == 0 {
        log::error!("Nothing was rendered.");
        std::process::exit(1);
    }

    let output = args.output.to_string_lossy();
    if let Err(e) = exr_utils::write_exr_to_file(&image, &output) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Image written to {}.", output);
}
