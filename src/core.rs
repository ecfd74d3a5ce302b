pub mod bake;
pub mod geometry;
