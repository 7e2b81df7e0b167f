pub mod composer;
pub mod layer;
