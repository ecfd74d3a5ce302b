//! Blendshape baker: applies one morph-target frame of a mesh to its base
//! geometry and writes the result out as a new static mesh asset.
//!
//! - `core`: the per-vertex bake over plain attribute arrays
//! - `scene`: meshes, blendshapes, renderer bindings and the source/sink traits
//! - `pipeline`: validation, bake, commit and rebind in one call
//! - `io`: config, OBJ/glTF sources and the file asset store

pub mod app;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod scene;

pub use crate::core::bake::{BakeReport, BakedFrame, DegeneratePolicy, bake_frame};
pub use crate::core::geometry::{DeltaFrame, VertexAttributes};
pub use crate::pipeline::baker::bake_blendshape;
pub use crate::pipeline::settings::BakeSettings;
pub use crate::scene::mesh::Mesh;
pub use crate::scene::renderer::SkinnedMeshRenderer;
pub use crate::scene::source::{MeshSink, MeshSource};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BakeError {
    #[error("No mesh bound: {0}")]
    InvalidReference(String),

    #[error("Blendshape index {index} is out of range ({count} blendshapes)")]
    InvalidIndex { index: i64, count: usize },

    #[error("Blendshape {blendshape} has no frame {frame} ({count} frames)")]
    InvalidFrame {
        blendshape: usize,
        frame: usize,
        count: usize,
    },

    #[error("Blendshape '{0}' not found")]
    BlendshapeNotFound(String),

    #[error("Array '{array}' has {actual} elements, expected {expected}")]
    LengthMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Mesh load error: {0}")]
    Load(String),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BakeError>;
