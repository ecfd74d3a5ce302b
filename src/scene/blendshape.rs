use crate::core::geometry::DeltaFrame;

/// Weight of a blendshape's only frame when the format carries none (0-100 scale).
pub const FULL_WEIGHT: f32 = 100.0;

/// One intensity level of a blendshape.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendshapeFrame {
    /// Frame weight on the 0-100 scale.
    pub weight: f32,
    pub deltas: DeltaFrame,
}

/// A named deformation of a mesh, made of one or more frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Blendshape {
    pub name: String,
    pub frames: Vec<BlendshapeFrame>,
}

impl Blendshape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    pub fn with_frame(mut self, weight: f32, deltas: DeltaFrame) -> Self {
        self.frames.push(BlendshapeFrame { weight, deltas });
        self
    }

    pub fn frame(&self, index: usize) -> Option<&BlendshapeFrame> {
        self.frames.get(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
