use std::sync::Arc;
use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use color_eyre::{Report, Result};
use futures::future::BoxFuture;
use mapmodel_common::AssetId;
use tokio::{
    select,
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::JoinSet,
};
use tokio_with_wasm::alias as tokio;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::data::asset::LoadError;

/// Fetches model geometry from a url; implementors own the transport.
pub trait GeometryLoader: Send + Sync + 'static {
    type Geometry: Send + 'static;

    fn load_geometry(&self, url: &str) -> BoxFuture<'static, Result<Self::Geometry, LoadError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub id: AssetId,
    pub generation: u64,
    pub url: String,
}

#[derive(Debug)]
pub struct LoadOutcome<G> {
    pub id: AssetId,
    pub generation: u64,
    pub result: Result<G, LoadError>,
    pub elapsed: Duration,
}

/// Runs geometry fetches off the render thread. Every request is spawned
/// as its own task, so a slow or failing url never holds up the others.
pub struct BackgroundLoader<L: GeometryLoader> {
    loader: Arc<L>,
    request_receiver: UnboundedReceiver<LoadRequest>,
    outcome_sender: UnboundedSender<LoadOutcome<L::Geometry>>,
    running_tasks: JoinSet<Result<()>>,
}

impl<L: GeometryLoader> BackgroundLoader<L> {
    pub fn new(
        loader: Arc<L>,
        request_receiver: UnboundedReceiver<LoadRequest>,
        outcome_sender: UnboundedSender<LoadOutcome<L::Geometry>>,
    ) -> Self {
        Self {
            loader,
            request_receiver,
            outcome_sender,
            running_tasks: JoinSet::new(),
        }
    }

    pub async fn process_request(
        loader: Arc<L>,
        outcome_sender: UnboundedSender<LoadOutcome<L::Geometry>>,
        request: LoadRequest,
    ) -> Result<()> {
        let LoadRequest {
            id,
            generation,
            url,
        } = request;

        let started = Instant::now();
        let result = loader.load_geometry(&url).await;
        let outcome = LoadOutcome {
            id,
            generation,
            result,
            elapsed: started.elapsed(),
        };

        outcome_sender
            .send(outcome)
            .map_err(|_| Report::msg("outcome receiver dropped before the load finished"))?;
        Ok(())
    }

    /// Runs until the request channel closes and the last task reports back.
    pub async fn run(&mut self) {
        loop {
            select! {
                Some(request) = self.request_receiver.recv() => {
                    let loader = self.loader.clone();
                    let sender = self.outcome_sender.clone();
                    self.running_tasks.spawn(async move {
                        Ok(Self::process_request(loader, sender, request).await?)
                    });
                    log::info!("Geometry loads running: {}", self.running_tasks.len());
                }
                Some(result) = self.running_tasks.join_next() => {
                    if let Err(err) = result.unwrap_or_else(|join_error| Err(Report::new(join_error))) {
                        log::error!("Error in a background load: {err:?}");
                    }
                    log::info!("Load finished, still running: {}", self.running_tasks.len());
                }
                else => break,
            }
        }
    }
}
