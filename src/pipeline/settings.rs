use crate::core::bake::DegeneratePolicy;
use crate::scene::source::MeshSource;
use crate::{BakeError, Result};
use serde::Deserialize;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Picks a blendshape either by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BlendshapeSelector {
    Index(i64),
    Name(String),
}

impl Default for BlendshapeSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl BlendshapeSelector {
    /// Resolves to a valid blendshape index of `source`.
    pub fn resolve<S: MeshSource + ?Sized>(&self, source: &S) -> Result<usize> {
        let count = source.blendshape_count();
        match self {
            Self::Index(index) => usize::try_from(*index)
                .ok()
                .filter(|&i| i < count)
                .ok_or(BakeError::InvalidIndex {
                    index: *index,
                    count,
                }),
            Self::Name(name) => source
                .find_blendshape(name)
                .ok_or_else(|| BakeError::BlendshapeNotFound(name.clone())),
        }
    }
}

impl FromStr for BlendshapeSelector {
    type Err = Infallible;

    /// Integers select by index, anything else by name.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

impl fmt::Display for BlendshapeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Everything one bake needs besides the renderer and the sink.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BakeSettings {
    pub blendshape_index: usize,
    pub frame: usize,
    pub degenerate: DegeneratePolicy,
}

impl BakeSettings {
    pub fn new(blendshape_index: usize, frame: usize) -> Self {
        Self {
            blendshape_index,
            frame,
            degenerate: DegeneratePolicy::default(),
        }
    }

    pub fn with_policy(mut self, degenerate: DegeneratePolicy) -> Self {
        self.degenerate = degenerate;
        self
    }
}
