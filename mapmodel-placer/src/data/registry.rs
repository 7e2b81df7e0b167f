use std::collections::BTreeMap;

use mapmodel_common::{AssetId, ModelDescriptor};
use thiserror::Error;

use crate::data::asset::{LoadError, LoadState, ModelAsset};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("a model with id \"{0}\" is already registered")]
    DuplicateId(AssetId),
    #[error("no model with id \"{0}\" is registered")]
    UnknownId(AssetId),
}

pub struct AssetRegistry<G> {
    assets: BTreeMap<AssetId, ModelAsset<G>>,
    next_generation: u64,
}

impl<G> AssetRegistry<G> {
    pub fn new() -> Self {
        Self {
            assets: BTreeMap::new(),
            next_generation: 0,
        }
    }

    /// Returns the generation the new entry's load task must carry.
    pub fn insert(&mut self, descriptor: ModelDescriptor) -> Result<u64, RegistryError> {
        if self.assets.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateId(descriptor.id));
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let asset = ModelAsset::new(descriptor, generation);
        self.assets.insert(asset.id().clone(), asset);
        Ok(generation)
    }

    pub fn remove(&mut self, id: &AssetId) -> Option<ModelAsset<G>> {
        self.assets.remove(id)
    }

    pub fn set_visible(&mut self, id: &AssetId, visible: bool) -> Result<(), RegistryError> {
        let asset = self
            .assets
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownId(id.clone()))?;
        asset.descriptor.visible = visible;
        Ok(())
    }

    pub fn get(&self, id: &AssetId) -> Option<&ModelAsset<G>> {
        self.assets.get(id)
    }

    /// Returns false when the slot is gone, was re-registered since the
    /// task started, or has already settled; the geometry is dropped then.
    pub fn mark_loaded(&mut self, id: &AssetId, generation: u64, geometry: G) -> bool {
        match self.assets.get_mut(id) {
            Some(asset) if asset.generation == generation && asset.state.is_pending() => {
                asset.state = LoadState::Loaded(geometry);
                true
            }
            _ => false,
        }
    }

    /// Failure counterpart of [`Self::mark_loaded`], same discard rules.
    pub fn mark_failed(&mut self, id: &AssetId, generation: u64, error: LoadError) -> bool {
        match self.assets.get_mut(id) {
            Some(asset) if asset.generation == generation && asset.state.is_pending() => {
                asset.state = LoadState::Failed(error);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelAsset<G>> {
        self.assets.values()
    }

    pub fn renderable(&self) -> impl Iterator<Item = &ModelAsset<G>> {
        self.assets.values().filter(|asset| asset.is_renderable())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
    }
}

impl<G> Default for AssetRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}
