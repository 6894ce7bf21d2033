pub mod cache;
pub mod common;
pub mod config;
pub mod depreciation;
pub mod error;
pub mod estimate;
pub mod modules;
pub mod normalize;
pub mod offer;
pub mod reconcile;
pub mod schemas;
pub mod score;
pub mod source;

pub use chrono;
