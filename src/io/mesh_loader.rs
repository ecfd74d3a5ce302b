use crate::io::asset_store::MeshAsset;
use crate::io::config::SourceConfig;
use crate::io::gltf_loader::load_gltf;
use crate::io::obj_loader::load_obj_with_blendshapes;
use crate::scene::mesh::Mesh;
use crate::{BakeError, Result};
use log::{info, warn};
use std::path::Path;

/// Loads the source mesh named in the config, picking the loader by file extension.
pub fn load_source_mesh(source: &SourceConfig) -> Result<Mesh> {
    let path = Path::new(&source.path);
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if extension != "obj" && !source.blendshapes.is_empty() {
        warn!(
            "Ignoring {} configured blendshape(s): only OBJ sources take target files",
            source.blendshapes.len()
        );
    }

    let mut mesh = match extension.as_str() {
        "obj" => {
            load_obj_with_blendshapes(&source.path, source.name.as_deref(), &source.blendshapes)?
        }
        "gltf" | "glb" => load_gltf(&source.path, source.name.as_deref())?,
        "json" => {
            info!("Loading mesh asset: {}", source.path);
            MeshAsset::load(path)?.into_mesh()?
        }
        other => {
            return Err(BakeError::Load(format!(
                "Unsupported mesh format '{}' for '{}'",
                other, source.path
            )));
        }
    };

    if let Some(name) = &source.name {
        mesh.name = name.clone();
    }
    Ok(mesh)
}
