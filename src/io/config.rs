use crate::core::bake::DegeneratePolicy;
use crate::pipeline::settings::BlendshapeSelector;
use crate::{BakeError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub bake: BakeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// Mesh file: `.obj`, `.gltf`, `.glb` or a previously baked `.json` asset.
    pub path: String,
    /// Mesh name, defaults to the file stem.
    pub name: Option<String>,
    /// Blendshape targets for OBJ sources, one OBJ file per frame.
    #[serde(default)]
    pub blendshapes: Vec<BlendshapeConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BlendshapeConfig {
    pub name: String,
    pub frames: Vec<FrameConfig>,
}

#[derive(Debug, Deserialize)]
pub struct FrameConfig {
    #[serde(default = "default_weight")]
    pub weight: f32,
    pub path: String,
}

fn default_weight() -> f32 {
    100.0
}

#[derive(Debug, Default, Deserialize)]
pub struct BakeConfig {
    #[serde(default)]
    pub blendshape: BlendshapeSelector,
    #[serde(default)]
    pub frame: usize,
    #[serde(default)]
    pub degenerate: DegeneratePolicy,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Asset directory, defaults to the source file's directory.
    pub dir: Option<String>,
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            pretty: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BakeError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| BakeError::Config(format!("Failed to parse TOML: {}", e)))?;

        if config.source.path.trim().is_empty() {
            return Err(BakeError::Config("source.path must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Directory new assets are written to.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output.dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(&self.source.path)
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [source]
            path = "assets/head.gltf"
            "#,
        )
        .unwrap();

        assert_eq!(config.bake.blendshape, BlendshapeSelector::Index(0));
        assert_eq!(config.bake.frame, 0);
        assert_eq!(config.bake.degenerate, DegeneratePolicy::RetainBase);
        assert!(config.output.pretty);
        assert_eq!(config.output_dir(), PathBuf::from("assets"));
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            [source]
            path = "head.obj"
            name = "Head"

            [[source.blendshapes]]
            name = "Smile"
            frames = [
                { weight = 50.0, path = "head_smile_half.obj" },
                { path = "head_smile.obj" },
            ]

            [bake]
            blendshape = "Smile"
            frame = 1
            degenerate = "zero"

            [output]
            dir = "baked"
            pretty = false
            "#,
        )
        .unwrap();

        assert_eq!(config.source.name.as_deref(), Some("Head"));
        assert_eq!(config.source.blendshapes[0].frames.len(), 2);
        assert_eq!(config.source.blendshapes[0].frames[0].weight, 50.0);
        assert_eq!(config.source.blendshapes[0].frames[1].weight, 100.0);
        assert_eq!(
            config.bake.blendshape,
            BlendshapeSelector::Name("Smile".to_string())
        );
        assert_eq!(config.bake.frame, 1);
        assert_eq!(config.bake.degenerate, DegeneratePolicy::Zero);
        assert_eq!(config.output_dir(), PathBuf::from("baked"));
        assert!(!config.output.pretty);
    }

    #[test]
    fn missing_source_is_an_error() {
        assert!(matches!(
            Config::from_toml("[bake]\nframe = 2\n"),
            Err(BakeError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("[source]\npath = \"\"\n"),
            Err(BakeError::Config(_))
        ));
    }
}
