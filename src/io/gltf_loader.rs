use crate::core::geometry::{DeltaFrame, VertexAttributes, check_len};
use crate::io::obj_loader::file_stem;
use crate::scene::blendshape::{Blendshape, FULL_WEIGHT};
use crate::scene::mesh::Mesh;
use crate::{BakeError, Result};
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3, Vector4};
use serde::Deserialize;
use std::path::Path;

/// Mesh extras written by most exporters to name morph targets.
#[derive(Deserialize)]
struct MeshExtras {
    #[serde(rename = "targetNames", default)]
    target_names: Vec<String>,
}

/// Loads the first mesh with morph targets (or the first mesh) from a glTF/GLB file.
///
/// Triangle primitives are merged into one mesh. Each morph target becomes a
/// blendshape with a single full-weight frame.
pub fn load_gltf(path: &str, name: Option<&str>) -> Result<Mesh> {
    info!("Loading glTF file: {}", path);

    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| BakeError::Load(format!("Failed to load glTF '{}': {}", path, e)))?;

    let gltf_mesh = document
        .meshes()
        .find(|m| m.primitives().any(|p| p.morph_targets().len() > 0))
        .or_else(|| document.meshes().next())
        .ok_or_else(|| BakeError::Load(format!("'{}' contains no meshes", path)))?;

    let mesh_name = name
        .map(str::to_string)
        .or_else(|| gltf_mesh.name().map(str::to_string))
        .unwrap_or_else(|| file_stem(Path::new(path)));

    let mut attributes = VertexAttributes::default();
    let mut indices: Vec<u32> = Vec::new();
    let mut targets: Vec<DeltaFrame> = Vec::new();
    let mut target_count: Option<usize> = None;

    for primitive in gltf_mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!(
                "Skipping primitive {} of '{}': mode {:?} is not a triangle list",
                primitive.index(),
                mesh_name,
                primitive.mode()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));

        let positions: Vec<Point3<f32>> = match reader.read_positions() {
            Some(iter) => iter.map(Point3::from).collect(),
            None => {
                warn!("Skipping primitive {} without positions", primitive.index());
                continue;
            }
        };
        let num_vertices = positions.len();
        let index_offset = attributes.len() as u32;

        let normals: Vec<Vector3<f32>> = match reader.read_normals() {
            Some(iter) => iter.map(Vector3::from).collect(),
            None => {
                warn!(
                    "Primitive {} of '{}' is missing normals. Using default (0, 1, 0).",
                    primitive.index(),
                    mesh_name
                );
                vec![Vector3::y(); num_vertices]
            }
        };
        let tangents: Vec<Vector4<f32>> = match reader.read_tangents() {
            Some(iter) => iter.map(Vector4::from).collect(),
            None => {
                warn!(
                    "Primitive {} of '{}' is missing tangents. Using default (1, 0, 0, 1).",
                    primitive.index(),
                    mesh_name
                );
                vec![Vector4::new(1.0, 0.0, 0.0, 1.0); num_vertices]
            }
        };

        attributes.positions.extend(positions);
        attributes.normals.extend(normals);
        attributes.tangents.extend(tangents);
        attributes.validate()?;

        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|i| i + index_offset)),
            None => indices.extend((0..num_vertices as u32).map(|i| i + index_offset)),
        }

        let primitive_targets = reader
            .read_morph_targets()
            .map(|(positions, normals, tangents)| {
                Ok(DeltaFrame::new(
                    read_displacements("morph_positions", positions, num_vertices)?,
                    read_displacements("morph_normals", normals, num_vertices)?,
                    read_displacements("morph_tangents", tangents, num_vertices)?,
                ))
            })
            .collect::<Result<Vec<DeltaFrame>>>()?;

        match target_count {
            None => {
                target_count = Some(primitive_targets.len());
                targets = primitive_targets;
            }
            Some(count) if count == primitive_targets.len() => {
                for (merged, frame) in targets.iter_mut().zip(primitive_targets) {
                    merged.positions.extend(frame.positions);
                    merged.normals.extend(frame.normals);
                    merged.tangents.extend(frame.tangents);
                }
            }
            Some(count) => {
                return Err(BakeError::Load(format!(
                    "Primitives of '{}' disagree on morph target count ({} vs {})",
                    mesh_name,
                    count,
                    primitive_targets.len()
                )));
            }
        }
    }

    let target_names = read_target_names(&gltf_mesh);
    let mut mesh = Mesh::new(mesh_name, attributes, indices);

    for (i, deltas) in targets.into_iter().enumerate() {
        let name = target_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("target_{i}"));
        mesh.add_blendshape(Blendshape::new(name).with_frame(FULL_WEIGHT, deltas))?;
    }

    info!(
        "glTF mesh '{}' loaded. Vertices: {}, Blendshapes: {}",
        mesh.name,
        mesh.vertex_count(),
        mesh.blendshapes.len()
    );

    Ok(mesh)
}

/// Reads one displacement accessor of a morph target. An absent accessor
/// means the target leaves that attribute alone.
fn read_displacements(
    array: &'static str,
    accessor: Option<impl Iterator<Item = [f32; 3]>>,
    num_vertices: usize,
) -> Result<Vec<Vector3<f32>>> {
    let Some(iter) = accessor else {
        return Ok(vec![Vector3::zeros(); num_vertices]);
    };
    let values: Vec<Vector3<f32>> = iter.map(Vector3::from).collect();
    check_len(array, num_vertices, values.len())?;
    Ok(values)
}

fn read_target_names(mesh: &gltf::Mesh) -> Vec<String> {
    let Some(raw) = mesh.extras() else {
        return Vec::new();
    };
    match serde_json::from_str::<MeshExtras>(raw.get()) {
        Ok(extras) => extras.target_names,
        Err(e) => {
            debug!("Ignoring unreadable mesh extras: {}", e);
            Vec::new()
        }
    }
}
