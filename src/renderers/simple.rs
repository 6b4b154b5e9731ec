// Copyright @yucwang 2021

use crate::core::integrator::Integrator;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::core::trace::SampleTrace;
use crate::io::exr_utils;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{ Float, Vector2f };
use crate::renderers::film::{ Film, Tile };
use indicatif::{ ProgressBar, ProgressStyle };
use std::path::{ Path, PathBuf };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::thread;

pub use super::renderer::Renderer;

const TILE_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub camera_id: usize,
    pub spp: u32,
    pub seed: u64,
    /// Zero picks the available parallelism.
    pub threads: usize,
    /// Passes between checkpoint images; zero disables them.
    pub checkpoint_interval: u32,
    /// Final image path; checkpoints are written next to it.
    pub output: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { camera_id: 0, spp: 1, seed: 0, threads: 0, checkpoint_interval: 0, output: None }
    }
}

/// `<stem>-<spp>spp.exr` next to the final image.
pub fn checkpoint_path(output: &Path, spp: u32) -> PathBuf {
    let stem = output.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    output.with_file_name(format!("{}-{:05}spp.exr", stem, spp))
}

/// Progressive tile renderer: each pass adds one sample to every pixel.
pub struct SimpleRenderer {
    integrator: Box<dyn Integrator>,
    options: RenderOptions,
    preprocessed: bool,
}

impl SimpleRenderer {
    pub fn new(integrator: Box<dyn Integrator>, options: RenderOptions) -> Self {
        Self { integrator, options, preprocessed: false }
    }

    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    fn thread_count(&self) -> usize {
        if self.options.threads > 0 {
            return self.options.threads;
        }
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    fn render_tile(&self, scene: &Scene, sensor: &dyn Sensor, pass: u32, mut tile: Tile, trace: &mut SampleTrace) -> Tile {
        let (width, height) = (sensor.width() as Float, sensor.height() as Float);
        for y in tile.y0..tile.y1 {
            for x in tile.x0..tile.x1 {
                let mut rng = LcgRng::for_pixel(self.options.seed, pass, x, y);
                let u = Vector2f::new((x as Float + rng.next_f32()) / width,
                                      (y as Float + rng.next_f32()) / height);
                let ray = sensor.sample_ray(&u);
                trace.reset(Some((x, y)));
                let radiance = self.integrator.radiance(&ray, scene, &mut rng, trace);
                tile.set(x, y, radiance);
            }
        }
        tile
    }

    fn render_pass(&self, scene: &Scene, sensor: &dyn Sensor, film: &Film, pass: u32, progress: &ProgressBar) {
        let (width, height) = (sensor.width(), sensor.height());
        let tiles_x = (width + TILE_SIZE - 1) / TILE_SIZE;
        let tiles_y = (height + TILE_SIZE - 1) / TILE_SIZE;
        let total_tiles = tiles_x * tiles_y;
        let next_tile = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..self.thread_count().min(total_tiles) {
                let next_tile = &next_tile;
                scope.spawn(move || {
                    let mut trace = SampleTrace::new();
                    loop {
                        let tile_index = next_tile.fetch_add(1, Ordering::Relaxed);
                        if tile_index >= total_tiles {
                            break;
                        }

                        let x0 = (tile_index % tiles_x) * TILE_SIZE;
                        let y0 = (tile_index / tiles_x) * TILE_SIZE;
                        let tile = Tile::new(x0, y0, (x0 + TILE_SIZE).min(width), (y0 + TILE_SIZE).min(height));
                        let tile = self.render_tile(scene, sensor, pass, tile, &mut trace);
                        film.commit_tile(&tile);
                        progress.inc(1);
                    }
                });
            }
        });
    }

    fn write_checkpoint(&self, film: &Film, spp: u32) {
        let output = match &self.options.output {
            Some(output) => output,
            None => return,
        };
        let path = checkpoint_path(output, spp);
        let path = path.to_string_lossy();
        match exr_utils::write_exr_to_file(&film.snapshot(), &path) {
            Ok(()) => log::info!("Checkpoint written to {}.", path),
            Err(e) => log::warn!("Checkpoint skipped: {}", e),
        }
    }
}

impl Renderer for SimpleRenderer {
    fn render(&mut self, scene: &Scene) -> Bitmap {
        let sensor = match scene.sensor(self.options.camera_id) {
            Some(sensor) => sensor,
            None => {
                log::error!("Scene has no sensor with id {}.", self.options.camera_id);
                return Bitmap::new(0, 0);
            }
        };
        let (width, height) = (sensor.width(), sensor.height());
        if width == 0 || height == 0 {
            return Bitmap::new(0, 0);
        }

        if !self.preprocessed {
            let mut rng = LcgRng::new(self.options.seed);
            self.integrator.preprocess(scene, sensor, &mut rng);
            self.preprocessed = true;
        }

        let spp = self.options.spp.max(1);
        let tiles = ((width + TILE_SIZE - 1) / TILE_SIZE) * ((height + TILE_SIZE - 1) / TILE_SIZE);
        log::info!("Rendering {}x{} at {} spp with {} on {} threads.",
                   width, height, spp, self.integrator.name(), self.thread_count());

        let progress = ProgressBar::new(tiles as u64 * spp as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tiles")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let film = Film::new(width, height);
        for pass in 0..spp {
            self.render_pass(scene, sensor, &film, pass, &progress);
            let done = pass + 1;
            if self.options.checkpoint_interval > 0 && done % self.options.checkpoint_interval == 0 && done < spp {
                self.write_checkpoint(&film, done);
            }
        }
        progress.finish_and_clear();
        film.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounce_controller::BounceController;
    use crate::integrators::path::PathIntegrator;
    use crate::integrators::test_scenes;
    use crate::math::constants::Vector3f;
    use crate::sensors::perspective::PerspectiveCamera;

    fn scene() -> Scene {
        let mut scene = test_scenes::plane_under_sphere_light(0.5, 4.0, 1.0, 3.0).scene;
        scene.add_sensor(Box::new(PerspectiveCamera::new(Vector3f::new(6.0, 0.0, 2.0),
                                                         Vector3f::zeros(),
                                                         Vector3f::new(0.0, 0.0, 1.0),
                                                         0.8, 40, 36)));
        scene
    }

    fn render(threads: usize) -> Bitmap {
        let options = RenderOptions { spp: 2, seed: 3, threads, ..RenderOptions::default() };
        let mut renderer = SimpleRenderer::new(Box::new(PathIntegrator::new(BounceController::new(0, 2))), options);
        renderer.render(&scene())
    }

    #[test]
    fn test_render_is_deterministic_across_thread_counts() {
        let single = render(1);
        let parallel = render(4);
        assert_eq!(single.width(), 40);
        assert_eq!(single.height(), 36);
        assert_eq!(single.pixels(), parallel.pixels());
        assert!(single.pixels().iter().all(|p| p.is_finite()));
        assert!(single.mean().r() > 0.0);
    }

    #[test]
    fn test_missing_sensor_gives_empty_image() {
        let options = RenderOptions { camera_id: 3, ..RenderOptions::default() };
        let mut renderer = SimpleRenderer::new(Box::new(PathIntegrator::new(BounceController::default())), options);
        assert_eq!(renderer.render(&scene()).width(), 0);
    }

    #[test]
    fn test_checkpoint_path() {
        let path = checkpoint_path(Path::new("/tmp/out/cbox.exr"), 16);
        assert_eq!(path, PathBuf::from("/tmp/out/cbox-00016spp.exr"));
    }

    #[test]
    fn test_checkpoints_are_written() {
        let dir = std::env::temp_dir().join(format!("depositer_checkpoint_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let output = dir.join("image.exr");
        let options = RenderOptions {
            spp: 4,
            threads: 2,
            checkpoint_interval: 2,
            output: Some(output.clone()),
            ..RenderOptions::default()
        };
        let mut renderer = SimpleRenderer::new(Box::new(PathIntegrator::new(BounceController::new(0, 1))), options);
        renderer.render(&scene());

        let checkpoint = checkpoint_path(&output, 2);
        assert!(checkpoint.exists());
        assert!(!checkpoint_path(&output, 4).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
