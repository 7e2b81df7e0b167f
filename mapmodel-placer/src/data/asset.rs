use mapmodel_common::{AssetId, ModelDescriptor};
use thiserror::Error;

use crate::projection::MercatorCoordinate;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to load geometry from {url}: {reason}")]
pub struct LoadError {
    pub url: String,
    pub reason: String,
}

impl LoadError {
    pub fn new(url: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<G> {
    Pending,
    Loaded(G),
    Failed(LoadError),
}

impl<G> LoadState<G> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// The generation ties the asset to the load task spawned for it. An
/// outcome whose generation differs from the stored one belongs to an
/// earlier registration of the same id and must not touch this slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset<G> {
    pub descriptor: ModelDescriptor,
    pub position: MercatorCoordinate,
    pub state: LoadState<G>,
    pub(crate) generation: u64,
}

impl<G> ModelAsset<G> {
    pub fn new(descriptor: ModelDescriptor, generation: u64) -> Self {
        let position = MercatorCoordinate::from_anchor(&descriptor.coords);
        Self {
            descriptor,
            position,
            state: LoadState::Pending,
            generation,
        }
    }

    pub fn id(&self) -> &AssetId {
        &self.descriptor.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn geometry(&self) -> Option<&G> {
        match &self.state {
            LoadState::Loaded(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn is_renderable(&self) -> bool {
        self.descriptor.visible && self.state.is_loaded()
    }
}
