use crate::core::geometry::{DeltaFrame, VertexAttributes};
use crate::scene::mesh::Mesh;
use crate::{BakeError, Result};
use std::path::PathBuf;

/// Read access to a mesh's base geometry and its blendshape frames.
pub trait MeshSource {
    fn name(&self) -> &str;

    fn base_attributes(&self) -> &VertexAttributes;

    fn blendshape_count(&self) -> usize;

    fn blendshape_name(&self, index: usize) -> Option<&str>;

    /// Number of frames of a blendshape, `None` if the index is out of range.
    fn frame_count(&self, blendshape: usize) -> Option<usize>;

    /// Weight (0-100) of a frame, `None` if either index is out of range.
    fn frame_weight(&self, blendshape: usize, frame: usize) -> Option<f32>;

    /// Returns the deltas of one blendshape frame.
    ///
    /// Fails with `InvalidIndex` or `InvalidFrame` when the pair does not exist.
    fn select_frame(&self, blendshape: usize, frame: usize) -> Result<&DeltaFrame>;

    fn vertex_count(&self) -> usize {
        self.base_attributes().len()
    }

    fn blendshape_names(&self) -> Vec<&str> {
        (0..self.blendshape_count())
            .filter_map(|i| self.blendshape_name(i))
            .collect()
    }

    /// Index of the first blendshape called `name`.
    fn find_blendshape(&self, name: &str) -> Option<usize> {
        (0..self.blendshape_count()).find(|&i| self.blendshape_name(i) == Some(name))
    }
}

/// Which frame a baked mesh came from.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeOrigin {
    pub source_mesh: String,
    pub blendshape: String,
    pub blendshape_index: usize,
    pub frame: usize,
    pub weight: f32,
}

/// Persists baked meshes.
///
/// Every commit creates a new asset; existing assets are never overwritten.
/// A mesh must only become visible once it has been written completely.
pub trait MeshSink {
    fn commit(&mut self, mesh: &Mesh, origin: &BakeOrigin) -> Result<PathBuf>;
}

impl MeshSource for Mesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    fn blendshape_count(&self) -> usize {
        self.blendshapes.len()
    }

    fn blendshape_name(&self, index: usize) -> Option<&str> {
        self.blendshapes.get(index).map(|b| b.name.as_str())
    }

    fn frame_count(&self, blendshape: usize) -> Option<usize> {
        self.blendshapes.get(blendshape).map(|b| b.frame_count())
    }

    fn frame_weight(&self, blendshape: usize, frame: usize) -> Option<f32> {
        self.blendshapes
            .get(blendshape)
            .and_then(|b| b.frame(frame))
            .map(|f| f.weight)
    }

    fn select_frame(&self, blendshape: usize, frame: usize) -> Result<&DeltaFrame> {
        let shape = self
            .blendshapes
            .get(blendshape)
            .ok_or(BakeError::InvalidIndex {
                index: blendshape as i64,
                count: self.blendshapes.len(),
            })?;

        shape
            .frame(frame)
            .map(|f| &f.deltas)
            .ok_or(BakeError::InvalidFrame {
                blendshape,
                frame,
                count: shape.frame_count(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::blendshape::Blendshape;

    #[test]
    fn lookups_on_test_quad() {
        let mut mesh = Mesh::create_test_quad();
        mesh.add_blendshape(Blendshape::new("Smile")).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.blendshape_names(), vec!["Raise", "Smile"]);
        assert_eq!(mesh.find_blendshape("Smile"), Some(1));
        assert_eq!(mesh.find_blendshape("Frown"), None);
        assert_eq!(mesh.frame_count(0), Some(1));
        assert_eq!(mesh.frame_count(2), None);
        assert_eq!(mesh.frame_weight(0, 0), Some(100.0));
    }

    #[test]
    fn select_frame_validates_both_indices() {
        let mut mesh = Mesh::create_test_quad();
        mesh.add_blendshape(Blendshape::new("Empty")).unwrap();

        assert_eq!(mesh.select_frame(0, 0).unwrap().len(), 4);
        assert!(matches!(
            mesh.select_frame(2, 0),
            Err(BakeError::InvalidIndex { index: 2, count: 2 })
        ));
        assert!(matches!(
            mesh.select_frame(0, 1),
            Err(BakeError::InvalidFrame { blendshape: 0, frame: 1, count: 1 })
        ));
        assert!(matches!(
            mesh.select_frame(1, 0),
            Err(BakeError::InvalidFrame { blendshape: 1, frame: 0, count: 0 })
        ));
    }
}
