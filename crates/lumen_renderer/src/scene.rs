//! Render-ready scene: camera, BVH and lights.

use std::sync::Arc;

use lumen_core::Mesh;

use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::light::{AreaLight, Light};
use crate::primitive::Primitive;
use crate::triangle::Triangle;

/// Everything the integrator needs to trace paths.
pub struct Scene {
    pub camera: Camera,
    pub bvh: Bvh,
    pub lights: Vec<Box<dyn Light>>,
}

impl Scene {
    pub fn new(camera: Camera, bvh: Bvh, lights: Vec<Box<dyn Light>>) -> Self {
        Self { camera, bvh, lights }
    }

    /// Build the BVH over every face of `mesh`. Faces with an emissive
    /// material also become area lights.
    pub fn from_mesh(mesh: Mesh, camera: Camera) -> Self {
        let mesh = Arc::new(mesh);
        let triangles = Triangle::from_mesh(&mesh);

        let lights: Vec<Box<dyn Light>> = triangles
            .iter()
            .filter(|t| t.material().is_emissive())
            .map(|t| Box::new(AreaLight::new(t.clone())) as Box<dyn Light>)
            .collect();

        let primitives: Vec<Arc<dyn Primitive>> = triangles
            .into_iter()
            .map(|t| t as Arc<dyn Primitive>)
            .collect();
        let bvh = Bvh::new(primitives);

        log::info!("Scene has {} triangles and {} lights.", bvh.len(), lights.len());
        if let Some(b) = bvh.bounds() {
            log::info!(
                "Bounds: [{:.2}, {:.2}] x [{:.2}, {:.2}] x [{:.2}, {:.2}]",
                b.min.x,
                b.max.x,
                b.min.y,
                b.max.y,
                b.min.z,
                b.max.z
            );
        }

        Self::new(camera, bvh, lights)
    }
}
