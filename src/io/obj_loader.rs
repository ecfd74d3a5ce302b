use crate::core::geometry::{DeltaFrame, VertexAttributes, check_len};
use crate::io::config::BlendshapeConfig;
use crate::scene::blendshape::Blendshape;
use crate::scene::mesh::Mesh;
use crate::{BakeError, Result};
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3, Vector4};
use std::path::Path;

/// Loads an OBJ file into a single mesh without blendshapes.
///
/// All models in the file are merged. OBJ has no tangents, so one is derived
/// per vertex from the normal (binormal sign +1).
pub fn load_obj(path: &str, name: Option<&str>) -> Result<Mesh> {
    let (attributes, indices) = read_obj_geometry(path)?;
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(Path::new(path)));
    Ok(Mesh::new(name, attributes, indices))
}

/// Loads a base OBJ and builds blendshapes from per-frame target OBJs.
///
/// Targets must share the base's vertex layout; each frame's deltas are the
/// target geometry minus the base geometry.
pub fn load_obj_with_blendshapes(
    path: &str,
    name: Option<&str>,
    blendshapes: &[BlendshapeConfig],
) -> Result<Mesh> {
    let mut mesh = load_obj(path, name)?;

    for config in blendshapes {
        let mut blendshape = Blendshape::new(config.name.clone());
        for frame in &config.frames {
            let (target, _) = read_obj_geometry(&frame.path)?;
            let deltas = delta_from_target(&mesh.attributes, &target)?;
            blendshape = blendshape.with_frame(frame.weight, deltas);
        }
        debug!(
            "Blendshape '{}' built from {} target(s)",
            config.name,
            config.frames.len()
        );
        mesh.add_blendshape(blendshape)?;
    }

    Ok(mesh)
}

/// Per-vertex difference `target - base`.
pub fn delta_from_target(base: &VertexAttributes, target: &VertexAttributes) -> Result<DeltaFrame> {
    let vertex_count = base.validate()?;
    check_len("target_positions", vertex_count, target.validate()?)?;

    let positions = target
        .positions
        .iter()
        .zip(&base.positions)
        .map(|(t, b)| t - b)
        .collect();
    let normals = target
        .normals
        .iter()
        .zip(&base.normals)
        .map(|(t, b)| t - b)
        .collect();
    let tangents = target
        .tangents
        .iter()
        .zip(&base.tangents)
        .map(|(t, b)| t.xyz() - b.xyz())
        .collect();

    Ok(DeltaFrame::new(positions, normals, tangents))
}

fn read_obj_geometry(path: &str) -> Result<(VertexAttributes, Vec<u32>)> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        return Err(BakeError::Load(format!("File not found: {}", path)));
    }

    info!("Loading OBJ file: {}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Important: Unifies indices for Position/Normal
        ..Default::default()
    };

    let (models, _materials) = tobj::load_obj(path_obj, &load_options)
        .map_err(|e| BakeError::Load(format!("Failed to load OBJ '{}': {}", path, e)))?;

    let mut attributes = VertexAttributes::default();
    let mut indices = Vec::new();
    let mut index_offset = 0;

    for model in models {
        let mesh = &model.mesh;
        let num_vertices = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();

        if !has_normals {
            warn!(
                "Mesh '{}' is missing normals. Using default (0, 1, 0).",
                model.name
            );
        }

        for i in 0..num_vertices {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );

            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vector3::y()
            };

            attributes.positions.push(position);
            attributes.normals.push(normal);
            attributes.tangents.push(tangent_from_normal(&normal));
        }

        // Merged models share one vertex array, so offset their indices.
        indices.extend(mesh.indices.iter().map(|index| index + index_offset));
        index_offset += num_vertices as u32;
    }

    info!(
        "OBJ loaded successfully. Total vertices: {}, Total indices: {}",
        attributes.len(),
        indices.len()
    );

    Ok((attributes, indices))
}

/// A unit tangent orthogonal to `normal`, built by Gram-Schmidt from +X (or +Z
/// when the normal is close to X).
fn tangent_from_normal(normal: &Vector3<f32>) -> Vector4<f32> {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::z()
    };
    let tangent = (reference - normal * normal.dot(&reference))
        .try_normalize(1e-6)
        .unwrap_or(reference);
    Vector4::new(tangent.x, tangent.y, tangent.z, 1.0)
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Mesh".to_string())
}
