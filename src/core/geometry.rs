use crate::{BakeError, Result};
use nalgebra::{Point3, Vector3, Vector4};

/// Per-vertex geometry of a mesh, stored as parallel arrays.
///
/// Index `i` in every array refers to the same vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexAttributes {
    /// Position in local object space.
    pub positions: Vec<Point3<f32>>,
    /// Shading normal, unit length by convention.
    pub normals: Vec<Vector3<f32>>,
    /// Tangent direction (xyz) and binormal sign (w).
    pub tangents: Vec<Vector4<f32>>,
}

impl VertexAttributes {
    pub fn new(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        tangents: Vec<Vector4<f32>>,
    ) -> Self {
        Self {
            positions,
            normals,
            tangents,
        }
    }

    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            tangents: Vec::with_capacity(vertex_count),
        }
    }

    /// Number of vertices, taken from the position array.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks that normals and tangents line up with positions and returns the vertex count.
    pub fn validate(&self) -> Result<usize> {
        let vertex_count = self.positions.len();
        check_len("base_normals", vertex_count, self.normals.len())?;
        check_len("base_tangents", vertex_count, self.tangents.len())?;
        Ok(vertex_count)
    }
}

/// Per-vertex deltas of one blendshape frame.
///
/// Tangent deltas carry direction only; the binormal sign is never animated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaFrame {
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub tangents: Vec<Vector3<f32>>,
}

impl DeltaFrame {
    pub fn new(
        positions: Vec<Vector3<f32>>,
        normals: Vec<Vector3<f32>>,
        tangents: Vec<Vector3<f32>>,
    ) -> Self {
        Self {
            positions,
            normals,
            tangents,
        }
    }

    /// A frame that leaves every vertex where it is.
    pub fn zeros(vertex_count: usize) -> Self {
        Self {
            positions: vec![Vector3::zeros(); vertex_count],
            normals: vec![Vector3::zeros(); vertex_count],
            tangents: vec![Vector3::zeros(); vertex_count],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks all three delta arrays against the base vertex count.
    pub fn validate(&self, vertex_count: usize) -> Result<()> {
        check_len("delta_positions", vertex_count, self.positions.len())?;
        check_len("delta_normals", vertex_count, self.normals.len())?;
        check_len("delta_tangents", vertex_count, self.tangents.len())
    }
}

pub(crate) fn check_len(array: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(BakeError::LengthMismatch {
            array,
            expected,
            actual,
        })
    }
}
