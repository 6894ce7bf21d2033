pub mod offer;
pub mod parts;
pub mod settings;
