pub mod control;
pub mod data;
pub mod placer;
pub mod projection;
pub mod render;

pub use control::background_loader::{GeometryLoader, LoadOutcome, LoadRequest};
pub use data::asset::{LoadError, LoadState, ModelAsset};
pub use data::registry::{AssetRegistry, RegistryError};
pub use placer::ModelPlacer;
pub use projection::MercatorCoordinate;
pub use render::layer::{DrawQueue, FrameContext, HostContext, MapLayer};
