use crate::Result;
use crate::core::geometry::{DeltaFrame, VertexAttributes};
use crate::scene::blendshape::{Blendshape, FULL_WEIGHT};
use nalgebra::{Point3, Vector3, Vector4};

/// A triangle mesh with per-vertex shading data and its blendshapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub attributes: VertexAttributes,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
    pub blendshapes: Vec<Blendshape>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, attributes: VertexAttributes, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            attributes,
            indices,
            blendshapes: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.attributes.len()
    }

    /// Adds a blendshape after checking every frame against the vertex count.
    /// Returns the new blendshape's index.
    pub fn add_blendshape(&mut self, blendshape: Blendshape) -> Result<usize> {
        let vertex_count = self.vertex_count();
        for frame in &blendshape.frames {
            frame.deltas.validate(vertex_count)?;
        }
        self.blendshapes.push(blendshape);
        Ok(self.blendshapes.len() - 1)
    }

    /// A full copy of this mesh with its geometry replaced.
    ///
    /// Indices and blendshapes are kept, so the copy stays a drop-in
    /// replacement for the original.
    pub fn with_geometry(&self, attributes: VertexAttributes) -> Self {
        Self {
            name: self.name.clone(),
            attributes,
            indices: self.indices.clone(),
            blendshapes: self.blendshapes.clone(),
        }
    }

    /// Creates a unit quad in the XY plane with a single "Raise" blendshape
    /// that lifts the top edge along +Z.
    ///
    /// Vertices are arranged in Counter-Clockwise (CCW) order.
    pub fn create_test_quad() -> Self {
        let positions = vec![
            Point3::new(-0.5, -0.5, 0.0), // Bottom Left
            Point3::new(0.5, -0.5, 0.0),  // Bottom Right
            Point3::new(0.5, 0.5, 0.0),   // Top Right
            Point3::new(-0.5, 0.5, 0.0),  // Top Left
        ];
        let vertex_count = positions.len();
        let attributes = VertexAttributes::new(
            positions,
            vec![Vector3::z(); vertex_count],
            vec![Vector4::new(1.0, 0.0, 0.0, 1.0); vertex_count],
        );

        let mut raise = DeltaFrame::zeros(vertex_count);
        for i in [2, 3] {
            raise.positions[i] = Vector3::new(0.0, 0.0, 0.5);
            raise.normals[i] = Vector3::new(0.0, -0.5, 0.0);
        }

        let mut mesh = Self::new("Quad", attributes, vec![0, 1, 2, 0, 2, 3]);
        mesh.blendshapes.push(Blendshape::new("Raise").with_frame(FULL_WEIGHT, raise));
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BakeError;

    #[test]
    fn add_blendshape_rejects_wrong_vertex_count() {
        let mut mesh = Mesh::create_test_quad();
        let bad = Blendshape::new("Bad").with_frame(FULL_WEIGHT, DeltaFrame::zeros(3));

        assert!(matches!(
            mesh.add_blendshape(bad),
            Err(BakeError::LengthMismatch { expected: 4, actual: 3, .. })
        ));
        assert_eq!(mesh.blendshapes.len(), 1);
    }

    #[test]
    fn with_geometry_keeps_topology_and_blendshapes() {
        let mesh = Mesh::create_test_quad();
        let mut attributes = mesh.attributes.clone();
        attributes.positions[0] = Point3::new(9.0, 9.0, 9.0);

        let copy = mesh.with_geometry(attributes);

        assert_eq!(copy.indices, mesh.indices);
        assert_eq!(copy.blendshapes, mesh.blendshapes);
        assert_eq!(copy.attributes.positions[0], Point3::new(9.0, 9.0, 9.0));
        assert_eq!(mesh.attributes.positions[0], Point3::new(-0.5, -0.5, 0.0));
    }
}
