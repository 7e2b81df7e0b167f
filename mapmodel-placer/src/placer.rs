use color_eyre::Result;
use mapmodel_common::{AssetId, ModelDescriptor};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_with_wasm::alias as tokio;

use crate::{
    control::{
        background_loader::{GeometryLoader, LoadOutcome, LoadRequest},
        controllers::LoaderControllers,
    },
    data::{
        asset::{LoadError, ModelAsset},
        registry::{AssetRegistry, RegistryError},
    },
    render::{
        composer,
        layer::{DrawQueue, FrameContext, HostContext, MapLayer},
    },
};

type FailureListener = Box<dyn FnMut(&AssetId, &LoadError) + Send>;

/// Registry of geo-anchored models plus the background loader feeding it
/// and the per-frame pump that folds finished loads back in.
pub struct ModelPlacer<L: GeometryLoader> {
    registry: AssetRegistry<L::Geometry>,
    controllers: LoaderControllers<L>,
    outcome_receiver: UnboundedReceiver<LoadOutcome<L::Geometry>>,
    failure_listener: Option<FailureListener>,
}

impl<L: GeometryLoader> ModelPlacer<L> {
    pub fn new(loader: L) -> Self {
        let (controllers, outcome_receiver) = LoaderControllers::new(loader);

        Self {
            registry: AssetRegistry::new(),
            controllers,
            outcome_receiver,
            failure_listener: None,
        }
    }

    pub fn set_failure_listener(
        &mut self,
        listener: impl FnMut(&AssetId, &LoadError) + Send + 'static,
    ) {
        self.failure_listener = Some(Box::new(listener));
    }

    pub fn register(&mut self, descriptor: ModelDescriptor) -> Result<(), RegistryError> {
        let id = descriptor.id.clone();
        let url = descriptor.url.clone();
        let generation = self.registry.insert(descriptor)?;
        log::info!("{id}: registered for {url}");

        let request = LoadRequest {
            id: id.clone(),
            generation,
            url: url.clone(),
        };
        if let Err(err) = self.controllers.send_request(request) {
            log::error!("Unable to queue geometry load for {id}: {err}");
            self.record_failure(
                &id,
                generation,
                LoadError::new(url, "background loader is not running"),
            );
        }

        Ok(())
    }

    /// A load still in flight keeps running but its outcome is dropped on
    /// arrival; removing an absent id is a no-op.
    pub fn unregister(&mut self, id: &AssetId) {
        if self.registry.remove(id).is_some() {
            log::info!("{id}: unregistered");
        }
    }

    pub fn set_visible(&mut self, id: &AssetId, visible: bool) -> Result<(), RegistryError> {
        self.registry.set_visible(id, visible)
    }

    pub fn get(&self, id: &AssetId) -> Option<&ModelAsset<L::Geometry>> {
        self.registry.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelAsset<L::Geometry>> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Folds finished loads into the registry without blocking.
    pub fn process_loads(&mut self) {
        while let Ok(outcome) = self.outcome_receiver.try_recv() {
            let LoadOutcome {
                id,
                generation,
                result,
                elapsed,
            } = outcome;

            match result {
                Ok(geometry) => {
                    if self.registry.mark_loaded(&id, generation, geometry) {
                        log::info!("{id}: geometry ready after {elapsed:?}");
                    } else {
                        log::debug!("{id}: dropping stale load outcome");
                    }
                }
                Err(error) => self.record_failure(&id, generation, error),
            }
        }
    }

    /// Empties the registry and stops the background loader; later
    /// registrations fail their assets immediately.
    pub fn dispose(&mut self) {
        self.registry.clear();
        self.outcome_receiver.close();
        self.controllers.shutdown();
        log::info!("Model placer disposed");
    }

    fn record_failure(&mut self, id: &AssetId, generation: u64, error: LoadError) {
        if self.registry.mark_failed(id, generation, error.clone()) {
            log::warn!("{id}: {error}");
            if let Some(listener) = &mut self.failure_listener {
                listener(id, &error);
            }
        } else {
            log::debug!("{id}: dropping stale load failure");
        }
    }
}

impl<L: GeometryLoader> MapLayer<L::Geometry> for ModelPlacer<L> {
    fn on_attach(&mut self, host: &HostContext<'_>) -> Result<()> {
        self.controllers
            .configure_background_runner(|future| host.spawn(future))
    }

    fn on_frame(&mut self, frame: &FrameContext, queue: &mut dyn DrawQueue<L::Geometry>) -> usize {
        self.process_loads();

        let mut submitted = 0;
        for asset in self.registry.renderable() {
            if let Some(geometry) = asset.geometry() {
                let matrix =
                    composer::clip_matrix(&frame.view_proj, &asset.descriptor, &asset.position);
                queue.submit_draw(geometry, matrix);
                submitted += 1;
            }
        }

        log::debug!("Submitted {submitted} of {} models", self.registry.len());
        submitted
    }
}
