//! Lumen Renderer - CPU path tracing
//!
//! A progressive Monte Carlo path tracer for triangle scenes with area
//! lights. Rays are traced through a BVH by a fixed pool of worker threads
//! that share one accumulation image.

pub mod bvh;
pub mod camera;
pub mod image;
pub mod integrator;
pub mod light;
pub mod output;
pub mod primitive;
pub mod renderer;
pub mod sampling;
pub mod scene;
pub mod scheduler;
pub mod triangle;

pub use bvh::{Bvh, BvhHit, BvhNode};
pub use camera::Camera;
pub use self::image::Image;
pub use integrator::PathTracer;
pub use light::{AreaLight, Light, LightSample};
pub use output::{ImageSink, PngSink};
pub use primitive::{Intersection, Primitive};
pub use renderer::{RenderError, RenderSettings, Renderer, WORKER_STACK_SIZE};
pub use scene::Scene;
pub use scheduler::{partition, WorkQueue, WorkUnit};
pub use triangle::Triangle;

pub use lumen_core::config::DEFAULT_GAMMA;
