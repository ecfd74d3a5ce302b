use crate::Result;
use crate::io::asset_store::FileAssetStore;
use crate::io::config::Config;
use crate::io::mesh_loader::load_source_mesh;
use crate::pipeline::baker::{BakeOutcome, bake_blendshape};
use crate::pipeline::settings::{BakeSettings, BlendshapeSelector};
use crate::scene::renderer::SkinnedMeshRenderer;
use crate::scene::source::MeshSource;
use crate::scene::utils::describe_blendshapes;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub blendshape: Option<BlendshapeSelector>,
    pub frame: Option<usize>,
    /// Print the blendshapes of the source mesh and stop.
    pub list_only: bool,
}

/// Runs one headless bake described by `config`.
///
/// Returns `None` in list mode.
pub fn run_cli(config: Config, options: RunOptions) -> Result<Option<BakeOutcome>> {
    let start_time = Instant::now();

    let mesh = load_source_mesh(&config.source)?;

    if options.list_only {
        if mesh.blendshape_count() == 0 {
            warn!("Mesh '{}' has no blendshapes", mesh.name);
        }
        for line in describe_blendshapes(&mesh) {
            println!("{line}");
        }
        return Ok(None);
    }

    let selector = options
        .blendshape
        .unwrap_or_else(|| config.bake.blendshape.clone());
    let blendshape_index = selector.resolve(&mesh)?;
    let settings = BakeSettings {
        blendshape_index,
        frame: options.frame.unwrap_or(config.bake.frame),
        degenerate: config.bake.degenerate,
    };
    info!("Selected blendshape {} -> index {}", selector, blendshape_index);

    let mut renderer = SkinnedMeshRenderer::new(
        mesh.name.clone(),
        mesh,
        Some(PathBuf::from(&config.source.path)),
    );
    let mut store = FileAssetStore::new(config.output_dir(), config.output.pretty);
    let outcome = bake_blendshape(&mut renderer, settings, &mut store)?;

    info!("Bake finished in {:.2?}", start_time.elapsed());
    Ok(Some(outcome))
}
