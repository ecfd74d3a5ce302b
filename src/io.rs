pub mod asset_store;
pub mod config;
pub mod gltf_loader;
pub mod mesh_loader;
pub mod obj_loader;
