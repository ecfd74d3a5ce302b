pub mod blendshape;
pub mod mesh;
pub mod renderer;
pub mod source;
pub mod utils;
