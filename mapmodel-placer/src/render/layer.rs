use std::pin::Pin;

use color_eyre::Result;
use glam::DMat4;
use tokio::task::JoinHandle;
use tokio_with_wasm::alias as tokio;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub view_proj: DMat4,
}

impl FrameContext {
    pub fn new(view_proj: DMat4) -> Self {
        Self { view_proj }
    }

    /// Hosts commonly hand the camera over as sixteen column-major doubles.
    pub fn from_view_proj_array(values: [f64; 16]) -> Self {
        Self {
            view_proj: DMat4::from_cols_array(&values),
        }
    }
}

pub struct HostContext<'h> {
    spawner: &'h dyn Fn(Pin<Box<dyn Future<Output = ()> + Send + 'static>>) -> JoinHandle<()>,
}

impl<'h> HostContext<'h> {
    pub fn new(
        spawner: &'h dyn Fn(Pin<Box<dyn Future<Output = ()> + Send + 'static>>) -> JoinHandle<()>,
    ) -> Self {
        Self { spawner }
    }

    pub fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>) -> JoinHandle<()> {
        (self.spawner)(future)
    }
}

pub trait DrawQueue<G> {
    fn submit_draw(&mut self, geometry: &G, model_to_clip: DMat4);
}

/// `on_attach` runs once when the host adopts the layer; `on_frame` runs
/// on the render thread once per frame and must not block.
pub trait MapLayer<G> {
    fn on_attach(&mut self, host: &HostContext<'_>) -> Result<()>;

    /// Returns the number of draws submitted this frame.
    fn on_frame(&mut self, frame: &FrameContext, queue: &mut dyn DrawQueue<G>) -> usize;
}
