use std::pin::Pin;
use std::sync::Arc;

use color_eyre::{Report, Result};
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
};
use tokio_with_wasm::alias as tokio;

use crate::control::background_loader::{
    BackgroundLoader, GeometryLoader, LoadOutcome, LoadRequest,
};

pub enum RunnerState<L: GeometryLoader> {
    Initialized(BackgroundLoader<L>),
    Started(JoinHandle<()>),
}

/// The loader starts inert so registrations can queue before any runtime
/// exists; the host hands over its spawner on attach and the buffer drains.
pub struct LoaderControllers<L: GeometryLoader> {
    runner_state: Option<RunnerState<L>>,
    request_sender: UnboundedSender<LoadRequest>,
}

impl<L: GeometryLoader> LoaderControllers<L> {
    pub fn new(loader: L) -> (Self, UnboundedReceiver<LoadOutcome<L::Geometry>>) {
        let (request_sender, request_receiver) = unbounded_channel();
        let (outcome_sender, outcome_receiver) = unbounded_channel();

        let runner = BackgroundLoader::new(Arc::new(loader), request_receiver, outcome_sender);

        (
            Self {
                runner_state: Some(RunnerState::Initialized(runner)),
                request_sender,
            },
            outcome_receiver,
        )
    }

    /// Later calls are no-ops so a layer re-attached by its host keeps the
    /// running task.
    pub fn configure_background_runner(
        &mut self,
        async_runner: impl FnOnce(Pin<Box<dyn Future<Output = ()> + Send + 'static>>) -> JoinHandle<()>,
    ) -> Result<(), Report> {
        match self.runner_state.take() {
            Some(RunnerState::Initialized(mut runner)) => {
                let pinned = Box::pin(async move { runner.run().await });
                self.runner_state = Some(RunnerState::Started(async_runner(pinned)));
            }
            other => self.runner_state = other,
        }

        Ok(())
    }

    pub fn send_request(&self, request: LoadRequest) -> Result<()> {
        // The aborted runner task may not have dropped its receiver yet, so
        // a send could still succeed; refuse by state instead.
        if self.runner_state.is_none() {
            return Err(Report::msg("the background loader is shut down"));
        }
        self.request_sender.send(request)?;
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        matches!(self.runner_state, Some(RunnerState::Started(_)))
    }

    pub fn shutdown(&mut self) {
        if let Some(RunnerState::Started(handle)) = self.runner_state.take() {
            handle.abort();
        }
    }
}

impl<L: GeometryLoader> Drop for LoaderControllers<L> {
    fn drop(&mut self) {
        if let Some(RunnerState::Started(handle)) = &mut self.runner_state {
            handle.abort();
        }
    }
}
