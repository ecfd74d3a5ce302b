pub mod baker;
pub mod settings;
