use crate::core::bake::{BakeReport, bake_frame_with_policy};
use crate::pipeline::settings::BakeSettings;
use crate::scene::mesh::Mesh;
use crate::scene::renderer::SkinnedMeshRenderer;
use crate::scene::source::{BakeOrigin, MeshSink, MeshSource};
use crate::{BakeError, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Result of a successful [`bake_blendshape`] call.
#[derive(Debug, Clone)]
pub struct BakeOutcome {
    pub asset_path: PathBuf,
    pub mesh: Arc<Mesh>,
    pub origin: BakeOrigin,
    pub report: BakeReport,
}

/// Bakes one blendshape frame of the renderer's mesh into a new mesh asset
/// and rebinds the renderer to it.
///
/// Steps: validate, copy the bound mesh, bake the frame into the copy,
/// commit it through `sink`, rebind. Any failure leaves the renderer bound to
/// its original mesh and nothing committed.
pub fn bake_blendshape<K: MeshSink + ?Sized>(
    renderer: &mut SkinnedMeshRenderer,
    settings: BakeSettings,
    sink: &mut K,
) -> Result<BakeOutcome> {
    let source = renderer
        .shared_mesh()
        .cloned()
        .ok_or_else(|| BakeError::InvalidReference(format!("renderer '{}'", renderer.name)))?;

    if source.vertex_count() == 0 {
        return Err(BakeError::InvalidReference(format!(
            "mesh '{}' has no vertices",
            source.name
        )));
    }

    let deltas = source.select_frame(settings.blendshape_index, settings.frame)?;
    let origin = BakeOrigin {
        source_mesh: source.name.clone(),
        blendshape: source
            .blendshape_name(settings.blendshape_index)
            .unwrap_or_default()
            .to_string(),
        blendshape_index: settings.blendshape_index,
        frame: settings.frame,
        weight: source
            .frame_weight(settings.blendshape_index, settings.frame)
            .unwrap_or_default(),
    };

    info!(
        "Baking blendshape '{}' (#{}), frame {} into mesh '{}' ({} vertices)",
        origin.blendshape,
        origin.blendshape_index,
        origin.frame,
        source.name,
        source.vertex_count()
    );

    let start_time = Instant::now();
    let baked = bake_frame_with_policy(source.base_attributes(), deltas, settings.degenerate)?;
    debug!("Bake completed in {:.2?}", start_time.elapsed());

    let mesh = Arc::new(source.with_geometry(baked.attributes));
    let asset_path = sink.commit(&mesh, &origin)?;

    renderer.rebind(Arc::clone(&mesh), Some(asset_path.clone()));
    info!("Renderer '{}' now uses '{}'", renderer.name, asset_path.display());

    Ok(BakeOutcome {
        asset_path,
        mesh,
        origin,
        report: baked.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bake::DegeneratePolicy;
    use crate::core::geometry::{DeltaFrame, VertexAttributes};
    use crate::scene::blendshape::Blendshape;
    use nalgebra::{Point3, Vector3};

    #[derive(Default)]
    struct MemorySink {
        committed: Vec<(Mesh, BakeOrigin)>,
    }

    impl MeshSink for MemorySink {
        fn commit(&mut self, mesh: &Mesh, origin: &BakeOrigin) -> Result<PathBuf> {
            self.committed.push((mesh.clone(), origin.clone()));
            Ok(PathBuf::from(format!(
                "memory/{} {}.asset.json",
                mesh.name,
                self.committed.len()
            )))
        }
    }

    struct FailingSink;

    impl MeshSink for FailingSink {
        fn commit(&mut self, _mesh: &Mesh, _origin: &BakeOrigin) -> Result<PathBuf> {
            Err(BakeError::Io(std::io::Error::other("disk full")))
        }
    }

    fn quad_renderer() -> SkinnedMeshRenderer {
        SkinnedMeshRenderer::new("Body", Mesh::create_test_quad(), None)
    }

    #[test]
    fn bakes_and_rebinds() {
        let mut renderer = quad_renderer();
        let original = Arc::clone(renderer.shared_mesh().unwrap());
        let mut sink = MemorySink::default();

        let outcome = bake_blendshape(&mut renderer, BakeSettings::new(0, 0), &mut sink).unwrap();

        assert_eq!(sink.committed.len(), 1);
        assert_eq!(outcome.origin.blendshape, "Raise");
        assert_eq!(outcome.origin.weight, 100.0);
        assert_eq!(renderer.asset_path(), Some(outcome.asset_path.as_path()));
        assert!(Arc::ptr_eq(renderer.shared_mesh().unwrap(), &outcome.mesh));

        let baked = &outcome.mesh.attributes;
        assert_eq!(baked.positions[2], Point3::new(0.5, 0.5, 0.5));
        assert_eq!(baked.positions[0], Point3::new(-0.5, -0.5, 0.0));
        let expected_normal = Vector3::new(0.0, -0.5, 1.0).normalize();
        assert!((baked.normals[3] - expected_normal).norm() < 1e-5);

        // The original asset is untouched.
        assert_eq!(original.attributes.positions[2], Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn rebaking_commits_a_new_asset_each_time() {
        let mut renderer = quad_renderer();
        let mut sink = MemorySink::default();

        let first = bake_blendshape(&mut renderer, BakeSettings::new(0, 0), &mut sink).unwrap();
        let second = bake_blendshape(&mut renderer, BakeSettings::new(0, 0), &mut sink).unwrap();

        assert_ne!(first.asset_path, second.asset_path);
        // The second bake starts from the first bake's output.
        assert_eq!(second.mesh.attributes.positions[2], Point3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn unbound_renderer_is_invalid_reference() {
        let mut renderer = SkinnedMeshRenderer::unbound("Empty");
        let mut sink = MemorySink::default();

        let result = bake_blendshape(&mut renderer, BakeSettings::new(0, 0), &mut sink);

        assert!(matches!(result, Err(BakeError::InvalidReference(_))));
        assert!(sink.committed.is_empty());
    }

    #[test]
    fn mesh_without_vertices_is_invalid_reference() {
        let mut mesh = Mesh::new("E", VertexAttributes::default(), Vec::new());
        let noop = Blendshape::new("Noop").with_frame(100.0, DeltaFrame::zeros(0));
        mesh.add_blendshape(noop).unwrap();
        let mut renderer = SkinnedMeshRenderer::new("Body", mesh, None);
        let bound = Arc::clone(renderer.shared_mesh().unwrap());
        let mut sink = MemorySink::default();

        let result = bake_blendshape(&mut renderer, BakeSettings::new(0, 0), &mut sink);

        assert!(matches!(result, Err(BakeError::InvalidReference(_))));
        assert!(sink.committed.is_empty());
        assert!(Arc::ptr_eq(renderer.shared_mesh().unwrap(), &bound));
        assert!(renderer.asset_path().is_none());
    }

    #[test]
    fn invalid_selection_commits_nothing() {
        let mut renderer = quad_renderer();
        let mut sink = MemorySink::default();

        assert!(matches!(
            bake_blendshape(&mut renderer, BakeSettings::new(5, 0), &mut sink),
            Err(BakeError::InvalidIndex { index: 5, count: 1 })
        ));
        assert!(matches!(
            bake_blendshape(&mut renderer, BakeSettings::new(0, 3), &mut sink),
            Err(BakeError::InvalidFrame { frame: 3, .. })
        ));
        assert!(sink.committed.is_empty());
        assert!(renderer.asset_path().is_none());
    }

    #[test]
    fn failed_commit_keeps_original_binding() {
        let mut renderer = quad_renderer();
        let original = Arc::clone(renderer.shared_mesh().unwrap());

        let result = bake_blendshape(&mut renderer, BakeSettings::new(0, 0), &mut FailingSink);

        assert!(matches!(result, Err(BakeError::Io(_))));
        assert!(Arc::ptr_eq(renderer.shared_mesh().unwrap(), &original));
    }

    #[test]
    fn cancelling_frame_uses_configured_policy() {
        let mut mesh = Mesh::create_test_quad();
        let mut cancel = DeltaFrame::zeros(4);
        cancel.normals[1] = Vector3::new(0.0, 0.0, -1.0);
        mesh.add_blendshape(Blendshape::new("Flatten").with_frame(100.0, cancel)).unwrap();
        let mut renderer = SkinnedMeshRenderer::new("Body", mesh, None);
        let mut sink = MemorySink::default();

        let settings = BakeSettings::new(1, 0).with_policy(DegeneratePolicy::Zero);
        let outcome = bake_blendshape(&mut renderer, settings, &mut sink).unwrap();

        assert_eq!(outcome.report.degenerate_normals, vec![1]);
        assert_eq!(outcome.mesh.attributes.normals[1], Vector3::zeros());
    }
}
