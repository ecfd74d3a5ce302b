use crate::scene::mesh::Mesh;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A render target bound to a shared mesh asset.
///
/// Baking never edits the bound mesh; it rebinds the renderer to a new one.
#[derive(Debug, Clone, Default)]
pub struct SkinnedMeshRenderer {
    pub name: String,
    shared_mesh: Option<Arc<Mesh>>,
    asset_path: Option<PathBuf>,
}

impl SkinnedMeshRenderer {
    pub fn new(name: impl Into<String>, mesh: Mesh, asset_path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            shared_mesh: Some(Arc::new(mesh)),
            asset_path,
        }
    }

    /// A renderer with no mesh bound.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn shared_mesh(&self) -> Option<&Arc<Mesh>> {
        self.shared_mesh.as_ref()
    }

    /// Where the bound mesh is stored, if it came from disk.
    pub fn asset_path(&self) -> Option<&Path> {
        self.asset_path.as_deref()
    }

    pub fn rebind(&mut self, mesh: Arc<Mesh>, asset_path: Option<PathBuf>) {
        self.shared_mesh = Some(mesh);
        self.asset_path = asset_path;
    }
}
