//! Multi-threaded progressive renderer.
//!
//! A fixed pool of worker threads drains the [`WorkQueue`], tracing one
//! sample per pixel of a unit before putting it back. A monitor thread
//! saves the partial image at a fixed interval until every worker is done,
//! then the final image is saved once more.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use lumen_core::Config;
use lumen_math::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::image::Image;
use crate::integrator::PathTracer;
use crate::output::ImageSink;
use crate::scene::Scene;
use crate::scheduler::WorkQueue;

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to save image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to spawn render thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Stack size of worker threads. Path recursion goes up to twice the bounce
/// limit, plus pass-through hits on transparent textures.
pub const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Longest the monitor sleeps between checks for finished workers.
const MONITOR_POLL: Duration = Duration::from_millis(50);

/// Job settings of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub threads: usize,
    pub partitions: usize,
    /// Samples per pixel
    pub samples: u32,
    pub gamma: f32,
    pub autosave_interval: Duration,
    /// Worker `i` seeds its generator with `seed + i`; entropy when `None`
    pub seed: Option<u64>,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            threads: config.job.threads,
            partitions: config.job.partitions,
            samples: config.rendering.samples,
            gamma: config.rendering.gamma,
            autosave_interval: Duration::from_millis(config.rendering.autosave_interval_ms),
            seed: config.rendering.seed,
        }
    }
}

/// Decrements the running-worker count when a worker exits, including by
/// panic, so the monitor always terminates.
struct RunningGuard<'a>(&'a AtomicUsize);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Renders scenes with a pool of worker threads.
pub struct Renderer<S: ImageSink> {
    settings: RenderSettings,
    tracer: PathTracer,
    sink: S,
}

impl<S: ImageSink> Renderer<S> {
    pub fn new(settings: RenderSettings, tracer: PathTracer, sink: S) -> Self {
        Self {
            settings,
            tracer,
            sink,
        }
    }

    pub fn from_config(config: &Config, sink: S) -> Self {
        Self::new(
            RenderSettings::from_config(config),
            PathTracer::from_config(config),
            sink,
        )
    }

    /// Render `scene` to `output`, returning the converged image.
    ///
    /// Intermediate saves that fail are logged and rendering continues; a
    /// failure of the final save is returned.
    pub fn render(&self, scene: &Scene, output: &Path) -> Result<Image, RenderError> {
        let camera = &scene.camera;
        let image = Image::new(camera.width, camera.height).with_gamma(self.settings.gamma);
        let queue = WorkQueue::partitioned(camera.pixel_count(), self.settings.partitions);
        let threads = self.settings.threads.max(1);
        let running = AtomicUsize::new(threads);

        log::info!(
            "Rendering {}x{} with {} threads, {} samples per pixel...",
            camera.width,
            camera.height,
            threads,
            self.settings.samples
        );
        let start = Instant::now();

        thread::scope(|s| -> Result<(), RenderError> {
            let (image, queue, running) = (&image, &queue, &running);

            for i in 0..threads {
                let spawned = thread::Builder::new()
                    .name(format!("lumen-worker-{i}"))
                    .stack_size(WORKER_STACK_SIZE)
                    .spawn_scoped(s, move || {
                        let _guard = RunningGuard(running);
                        let mut rng = self.worker_rng(i);
                        self.work(scene, image, queue, &mut rng);
                    });

                if let Err(e) = spawned {
                    // Workers that never started will never decrement.
                    running.fetch_sub(threads - i, Ordering::SeqCst);
                    return Err(RenderError::Spawn(e));
                }
            }

            thread::Builder::new()
                .name("lumen-autosave".into())
                .spawn_scoped(s, move || self.monitor(image, queue, running, output))
                .map_err(RenderError::Spawn)?;

            Ok(())
        })?;

        log::info!("Finished in {:.2?}.", start.elapsed());

        self.sink.save(output, &image)?;
        Ok(image)
    }

    fn worker_rng(&self, index: usize) -> StdRng {
        match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// Drain the queue, one pass over a unit per pop.
    fn work(&self, scene: &Scene, image: &Image, queue: &WorkQueue, rng: &mut StdRng) {
        let camera = &scene.camera;
        let width = camera.width as usize;

        while let Some(mut unit) = queue.try_pop() {
            for i in unit.begin..unit.end {
                let x = (i % width) as u32;
                let y = (i / width) as u32;

                let ray = camera.pixel_ray(x, y, rng);
                let mut color = self.tracer.trace(scene, &ray, rng);
                // A single NaN would stick in the running average forever.
                if !color.is_finite() {
                    color = Color::ZERO;
                }
                image.blend(i, color, unit.samples);
            }

            unit.samples += 1;
            if unit.samples < self.settings.samples {
                queue.push(unit);
            }
        }
    }

    /// Periodically save the image and report progress while workers run.
    fn monitor(&self, image: &Image, queue: &WorkQueue, running: &AtomicUsize, output: &Path) {
        let interval = self.settings.autosave_interval;
        let mut last_save = Instant::now();

        while running.load(Ordering::SeqCst) > 0 {
            thread::sleep(MONITOR_POLL.min(interval));

            if last_save.elapsed() < interval || running.load(Ordering::SeqCst) == 0 {
                continue;
            }

            if let Err(e) = self.sink.save(output, image) {
                log::warn!("Autosave failed: {}", e);
            }

            let progress = queue.peek().map_or(self.settings.samples, |u| u.samples);
            log::info!("{} samples...", progress);
            last_save = Instant::now();
        }
    }
}
