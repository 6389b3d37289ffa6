//! Triangle primitive for ray tracing.
//!
//! Triangles index into a shared [`Mesh`], so vertex data is stored once
//! no matter how many triangles reference it.

use std::sync::Arc;

use lumen_core::{Face, Material, Mesh};
use lumen_math::{BoundingBox, Ray, Vec2, Vec3};

use crate::primitive::{Intersection, Primitive};

/// Rays closer than this to parallel with the triangle plane are rejected.
const PARALLEL_EPSILON: f32 = 1e-4;

/// A triangle referencing a face of a shared mesh.
pub struct Triangle {
    mesh: Arc<Mesh>,
    face: Face,
    /// Bounding box
    bounds: BoundingBox,
}

impl Triangle {
    /// Create the triangle for face `index` of `mesh`.
    ///
    /// Panics if `index` is out of range.
    pub fn new(mesh: Arc<Mesh>, index: usize) -> Self {
        let face = mesh.faces[index];
        let [a, b, c] = mesh.face_positions(&face);

        let mut bounds = BoundingBox::new(a);
        bounds.expand(b);
        bounds.expand(c);

        Self { mesh, face, bounds }
    }

    /// One triangle per face of `mesh`, in face order.
    pub fn from_mesh(mesh: &Arc<Mesh>) -> Vec<Arc<Triangle>> {
        (0..mesh.faces.len())
            .map(|i| Arc::new(Triangle::new(mesh.clone(), i)))
            .collect()
    }

    /// Corner positions.
    pub fn positions(&self) -> [Vec3; 3] {
        self.mesh.face_positions(&self.face)
    }

    /// Surface area.
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.positions();
        0.5 * (b - a).cross(c - a).length()
    }

    fn normals(&self) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.face.vertices.map(|v| v.normal);
        Some([a?, b?, c?].map(|i| self.mesh.normals[i as usize]))
    }

    fn texcoords(&self) -> Option<[Vec2; 3]> {
        let [a, b, c] = self.face.vertices.map(|v| v.texcoord);
        Some([a?, b?, c?].map(|i| self.mesh.texcoords[i as usize]))
    }
}

impl Primitive for Triangle {
    /// Plane intersection followed by an inside test against each edge.
    ///
    /// The barycentric weights are the areas of the sub-triangles opposite
    /// each corner, relative to the whole triangle.
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let [a, b, c] = self.positions();
        let ab = b - a;
        let ac = c - a;

        let cross = ab.cross(ac);
        let double_area = cross.length();
        if double_area <= f32::EPSILON {
            return None;
        }
        let n = cross / double_area;

        // Ray is parallel to the triangle plane
        let denom = n.dot(ray.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (a - ray.origin).dot(n) / denom;
        if t < 0.0 {
            return None;
        }
        let p = ray.at(t);

        let x = ab.cross(p - a);
        if n.dot(x) < 0.0 {
            return None;
        }

        let z = ac.cross(p - c);
        if n.dot(z) > 0.0 {
            return None;
        }

        let y = (c - b).cross(p - b);
        if n.dot(y) < 0.0 {
            return None;
        }

        // Weights of c, b and a respectively
        let u = x.length() / double_area;
        let w = z.length() / double_area;
        let v = y.length() / double_area;

        let normal = match self.normals() {
            Some([na, nb, nc]) => (u * nc + w * nb + v * na).normalize_or_zero(),
            None if denom > 0.0 => -n,
            None => n,
        };

        let uv = self
            .texcoords()
            .map(|[ta, tb, tc]| u * tc + w * tb + v * ta);

        Some(Intersection {
            distance: t,
            normal,
            uv,
        })
    }

    fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    fn material(&self) -> &Material {
        &self.mesh.materials[self.face.material]
    }

    fn has_texture_coordinates(&self) -> bool {
        self.face.vertices.iter().all(|v| v.texcoord.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Vertex;
    use lumen_math::Color;

    fn corner(i: u32) -> Vertex {
        Vertex {
            position: i,
            normal: Some(i),
            texcoord: Some(i),
        }
    }

    /// Triangle (0,0,0), (2,0,0), (0,2,0) with optional per-vertex normals and UVs.
    fn test_triangle(smooth: bool) -> Triangle {
        let mut mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
            ],
            vec![Vec3::Z, Vec3::Z, Vec3::Y],
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            [Material::diffuse("grey", Color::splat(0.5))],
        );
        if smooth {
            mesh.add_face([corner(0), corner(1), corner(2)], Some(1));
        } else {
            mesh.add_face([Vertex::new(0), Vertex::new(1), Vertex::new(2)], Some(1));
        }
        Triangle::new(Arc::new(mesh), 0)
    }

    fn centroid() -> Vec3 {
        Vec3::new(2.0 / 3.0, 2.0 / 3.0, 0.0)
    }

    #[test]
    fn test_triangle_hit_centroid() {
        let tri = test_triangle(false);
        let ray = Ray::new(centroid() + Vec3::Z, -Vec3::Z);

        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!(hit.uv.is_none());
    }

    #[test]
    fn test_flat_normal_faces_ray() {
        let tri = test_triangle(false);
        let ray = Ray::new(centroid() - Vec3::Z, Vec3::Z);

        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.normal + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let tri = test_triangle(false);

        for origin in [
            Vec3::new(2.0, 2.0, 1.0),
            Vec3::new(-0.5, 0.5, 1.0),
            Vec3::new(0.5, -0.5, 1.0),
        ] {
            assert!(tri.intersect(&Ray::new(origin, -Vec3::Z)).is_none());
        }
    }

    #[test]
    fn test_triangle_miss_parallel() {
        let tri = test_triangle(false);
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::X);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_miss_behind() {
        let tri = test_triangle(false);
        let ray = Ray::new(centroid() + Vec3::Z, Vec3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_interpolated_attributes() {
        let tri = test_triangle(true);
        assert!(tri.has_texture_coordinates());

        // Right at corner a all weight goes to a.
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert!(hit.uv.unwrap().length() < 1e-4);

        // Centroid blends the normals equally.
        let hit = tri.intersect(&Ray::new(centroid() + Vec3::Z, -Vec3::Z)).unwrap();
        let expected = (Vec3::Z * 2.0 + Vec3::Y).normalize();
        assert!((hit.normal - expected).length() < 1e-4);
        let uv = hit.uv.unwrap();
        assert!((uv - Vec2::splat(1.0 / 3.0)).length() < 1e-4);
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let mut mesh = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            Vec::new(),
            Vec::new(),
            [],
        );
        mesh.add_face([Vertex::new(0), Vertex::new(1), Vertex::new(2)], None);
        let tri = Triangle::new(Arc::new(mesh), 0);

        assert!(tri.intersect(&Ray::new(Vec3::new(1.0, 0.0, 1.0), -Vec3::Z)).is_none());
    }

    #[test]
    fn test_bounds_and_area() {
        let tri = test_triangle(false);
        assert_eq!(tri.bounds().min, Vec3::ZERO);
        assert_eq!(tri.bounds().max, Vec3::new(2.0, 2.0, 0.0));
        assert!((tri.area() - 2.0).abs() < 1e-6);
        assert_eq!(tri.material().name, "grey");
    }
}
