use crate::Result;
use crate::core::geometry::{DeltaFrame, VertexAttributes};
use log::{debug, warn};
use nalgebra::{Point3, Vector3, Vector4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Magnitude at or below which a summed normal/tangent has no usable direction.
pub const NORMALIZE_EPSILON: f32 = 1e-5;

/// What to emit for a vertex whose summed normal or tangent cannot be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Keep the (normalized) base direction. Falls back to +Y for normals and
    /// +X for tangents when the base direction is degenerate as well.
    #[default]
    RetainBase,
    /// Emit the zero vector.
    Zero,
}

/// Vertices that hit the degenerate case during a bake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BakeReport {
    pub degenerate_normals: Vec<usize>,
    pub degenerate_tangents: Vec<usize>,
}

impl BakeReport {
    pub fn is_clean(&self) -> bool {
        self.degenerate_normals.is_empty() && self.degenerate_tangents.is_empty()
    }
}

/// Geometry produced by [`bake_frame`], plus the per-vertex diagnostics.
#[derive(Debug, Clone)]
pub struct BakedFrame {
    pub attributes: VertexAttributes,
    pub report: BakeReport,
}

struct BakedVertex {
    position: Point3<f32>,
    normal: Vector3<f32>,
    tangent: Vector4<f32>,
    normal_degenerate: bool,
    tangent_degenerate: bool,
}

/// Applies `delta` to `base` with the default [`DegeneratePolicy`].
pub fn bake_frame(base: &VertexAttributes, delta: &DeltaFrame) -> Result<BakedFrame> {
    bake_frame_with_policy(base, delta, DegeneratePolicy::default())
}

/// Applies one blendshape frame to the base geometry.
///
/// Per vertex:
/// - position = base + delta
/// - normal = normalize(base + delta)
/// - tangent.xyz = normalize(base.xyz + delta), tangent.w = base.w
///
/// All lengths are checked before any vertex is touched. Vertices are
/// independent of each other and are processed in parallel.
pub fn bake_frame_with_policy(
    base: &VertexAttributes,
    delta: &DeltaFrame,
    policy: DegeneratePolicy,
) -> Result<BakedFrame> {
    let vertex_count = base.validate()?;
    delta.validate(vertex_count)?;

    debug!("Baking {} vertices (policy: {:?})", vertex_count, policy);

    let baked: Vec<BakedVertex> = (0..vertex_count)
        .into_par_iter()
        .map(|i| {
            bake_vertex(
                &base.positions[i],
                &base.normals[i],
                &base.tangents[i],
                &delta.positions[i],
                &delta.normals[i],
                &delta.tangents[i],
                policy,
            )
        })
        .collect();

    let mut attributes = VertexAttributes::with_capacity(vertex_count);
    let mut report = BakeReport::default();

    for (i, vertex) in baked.into_iter().enumerate() {
        attributes.positions.push(vertex.position);
        attributes.normals.push(vertex.normal);
        attributes.tangents.push(vertex.tangent);

        if vertex.normal_degenerate {
            report.degenerate_normals.push(i);
        }
        if vertex.tangent_degenerate {
            report.degenerate_tangents.push(i);
        }
    }

    if !report.is_clean() {
        warn!(
            "{} normals and {} tangents cancelled out to zero length; applied {:?} fallback",
            report.degenerate_normals.len(),
            report.degenerate_tangents.len(),
            policy
        );
    }

    Ok(BakedFrame { attributes, report })
}

#[inline]
fn bake_vertex(
    base_position: &Point3<f32>,
    base_normal: &Vector3<f32>,
    base_tangent: &Vector4<f32>,
    delta_position: &Vector3<f32>,
    delta_normal: &Vector3<f32>,
    delta_tangent: &Vector3<f32>,
    policy: DegeneratePolicy,
) -> BakedVertex {
    let position = base_position + delta_position;

    let (normal, normal_degenerate) =
        blend_direction(base_normal, delta_normal, Vector3::y(), policy);

    let (direction, tangent_degenerate) =
        blend_direction(&base_tangent.xyz(), delta_tangent, Vector3::x(), policy);
    let tangent = Vector4::new(direction.x, direction.y, direction.z, base_tangent.w);

    BakedVertex {
        position,
        normal,
        tangent,
        normal_degenerate,
        tangent_degenerate,
    }
}

/// Sums and renormalizes a direction. The flag is set when the policy had to step in.
#[inline]
fn blend_direction(
    base: &Vector3<f32>,
    delta: &Vector3<f32>,
    axis: Vector3<f32>,
    policy: DegeneratePolicy,
) -> (Vector3<f32>, bool) {
    match normalized(&(base + delta)) {
        Some(direction) => (direction, false),
        None => {
            let fallback = match policy {
                DegeneratePolicy::RetainBase => normalized(base).unwrap_or(axis),
                DegeneratePolicy::Zero => Vector3::zeros(),
            };
            (fallback, true)
        }
    }
}

/// Returns `None` for vectors too short (or not finite) to carry a direction.
#[inline]
pub fn normalized(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    let norm = v.norm();
    if norm > NORMALIZE_EPSILON && norm.is_finite() {
        Some(v / norm)
    } else {
        None
    }
}
