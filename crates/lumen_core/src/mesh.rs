//! Indexed triangle geometry.
//!
//! A `Mesh` owns the vertex attribute arrays and the material table of a
//! scene. Triangles refer into them by index, so the arrays are shared by
//! every face instead of being copied per triangle.

use lumen_math::{Vec2, Vec3};

use crate::material::Material;

/// Attribute indices of one triangle corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    /// Index into [`Mesh::positions`]
    pub position: u32,
    /// Index into [`Mesh::normals`], if the corner has a normal
    pub normal: Option<u32>,
    /// Index into [`Mesh::texcoords`], if the corner has a texture coordinate
    pub texcoord: Option<u32>,
}

impl Vertex {
    /// A corner with a position only.
    pub fn new(position: u32) -> Self {
        Self {
            position,
            normal: None,
            texcoord: None,
        }
    }
}

/// A triangle: three corners and a material index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [Vertex; 3],
    /// Index into [`Mesh::materials`]
    pub material: usize,
}

/// Vertex positions, optional normals and UVs, materials and faces.
///
/// Material 0 is always the fallback material; faces without a valid
/// material reference use it.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<Vec3>,

    /// Vertex normals, referenced per corner
    pub normals: Vec<Vec3>,

    /// Texture coordinates, referenced per corner
    pub texcoords: Vec<Vec2>,

    /// Material table, fallback first
    pub materials: Vec<Material>,

    /// Triangles
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Create a mesh from attribute arrays, with no faces yet.
    ///
    /// `materials` are appended after the fallback material, so the
    /// material at position `i` in the argument gets index `i + 1`.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        texcoords: Vec<Vec2>,
        materials: impl IntoIterator<Item = Material>,
    ) -> Self {
        let mut all_materials = vec![Material::fallback()];
        all_materials.extend(materials);
        Self {
            positions,
            normals,
            texcoords,
            materials: all_materials,
            faces: Vec::new(),
        }
    }

    /// Add a triangle.
    ///
    /// Faces with an out of range position index are rejected and `false`
    /// is returned. Normal and texture indices are all-or-nothing: if any
    /// corner lacks one or points out of range, they are dropped for all
    /// three corners. `material` is an index into [`Mesh::materials`];
    /// `None` or an out of range index selects the fallback material.
    pub fn add_face(&mut self, mut vertices: [Vertex; 3], material: Option<usize>) -> bool {
        let positions = self.positions.len();
        if vertices
            .iter()
            .any(|v| v.position as usize >= positions)
        {
            return false;
        }

        let normals = self.normals.len();
        if !vertices
            .iter()
            .all(|v| v.normal.is_some_and(|n| (n as usize) < normals))
        {
            vertices.iter_mut().for_each(|v| v.normal = None);
        }

        let texcoords = self.texcoords.len();
        if !vertices
            .iter()
            .all(|v| v.texcoord.is_some_and(|t| (t as usize) < texcoords))
        {
            vertices.iter_mut().for_each(|v| v.texcoord = None);
        }

        let material = material
            .filter(|&m| m < self.materials.len())
            .unwrap_or(0);

        self.faces.push(Face { vertices, material });
        true
    }

    /// Drop normals from every face so that flat shading is used.
    pub fn strip_normals(&mut self) {
        for face in &mut self.faces {
            face.vertices.iter_mut().for_each(|v| v.normal = None);
        }
    }

    /// Positions of the three corners of `face`.
    pub fn face_positions(&self, face: &Face) -> [Vec3; 3] {
        face.vertices.map(|v| self.positions[v.position as usize])
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Color;

    fn triangle_mesh() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![Vec3::Z],
            vec![Vec2::ZERO, Vec2::X, Vec2::Y],
            [Material::diffuse("grey", Color::splat(0.5))],
        )
    }

    fn corner(position: u32, normal: Option<u32>, texcoord: Option<u32>) -> Vertex {
        Vertex {
            position,
            normal,
            texcoord,
        }
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = triangle_mesh();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.materials.len(), 2);
        assert!(mesh.materials[0].is_emissive());
    }

    #[test]
    fn test_add_face_keeps_complete_attributes() {
        let mut mesh = triangle_mesh();
        let ok = mesh.add_face(
            [
                corner(0, Some(0), Some(0)),
                corner(1, Some(0), Some(1)),
                corner(2, Some(0), Some(2)),
            ],
            Some(1),
        );

        assert!(ok);
        let face = mesh.faces[0];
        assert_eq!(face.material, 1);
        assert!(face.vertices.iter().all(|v| v.normal == Some(0)));
        assert_eq!(face.vertices[2].texcoord, Some(2));
    }

    #[test]
    fn test_add_face_drops_partial_attributes() {
        let mut mesh = triangle_mesh();
        mesh.add_face(
            [
                corner(0, Some(0), Some(0)),
                corner(1, None, Some(1)),
                corner(2, Some(0), Some(7)),
            ],
            None,
        );

        let face = mesh.faces[0];
        assert_eq!(face.material, 0);
        assert!(face.vertices.iter().all(|v| v.normal.is_none()));
        assert!(face.vertices.iter().all(|v| v.texcoord.is_none()));
    }

    #[test]
    fn test_add_face_rejects_bad_position() {
        let mut mesh = triangle_mesh();
        assert!(!mesh.add_face([Vertex::new(0), Vertex::new(1), Vertex::new(3)], Some(1)));
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_bad_material_falls_back() {
        let mut mesh = triangle_mesh();
        mesh.add_face([Vertex::new(0), Vertex::new(1), Vertex::new(2)], Some(42));
        assert_eq!(mesh.faces[0].material, 0);
    }

    #[test]
    fn test_strip_normals() {
        let mut mesh = triangle_mesh();
        mesh.add_face(
            [
                corner(0, Some(0), None),
                corner(1, Some(0), None),
                corner(2, Some(0), None),
            ],
            Some(1),
        );
        mesh.strip_normals();
        assert!(mesh.faces[0].vertices.iter().all(|v| v.normal.is_none()));
    }

    #[test]
    fn test_face_positions() {
        let mut mesh = triangle_mesh();
        mesh.add_face([Vertex::new(2), Vertex::new(0), Vertex::new(1)], None);
        let [a, b, c] = mesh.face_positions(&mesh.faces[0]);
        assert_eq!(a, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(b, Vec3::ZERO);
        assert_eq!(c, Vec3::X);
    }
}
