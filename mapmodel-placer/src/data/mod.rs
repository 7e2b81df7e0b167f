pub mod asset;
pub mod registry;
