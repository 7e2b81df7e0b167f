use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use color_eyre::Result;
use futures::future::BoxFuture;
use glam::{DMat4, DVec3};
use itertools::Itertools;
use mapmodel_common::{GeoAnchor, ModelDescriptor};
use mapmodel_placer::{
    DrawQueue, FrameContext, GeometryLoader, HostContext, LoadError, MapLayer,
    MercatorCoordinate, ModelPlacer,
};
use tokio::runtime::Runtime;
use tokio_with_wasm::alias as tokio;

const SITE_CENTER: (f64, f64) = (-122.514522, 37.967155);

const MODEL_CATALOG: &str = r#"[
    {
        "id": "pond-model",
        "coords": [-122.51465, 37.9669],
        "url": "assets/images/pond_pack.glb",
        "visible": true,
        "scale_meters": 0.05
    },
    {
        "id": "bench-model",
        "coords": [-122.5151, 37.96765],
        "url": "assets/images/bench.glb",
        "visible": true,
        "scale_meters": 0.05
    },
    {
        "id": "closet-model",
        "coords": [-122.514, 37.9677],
        "url": "assets/images/closet.glb",
        "visible": true,
        "scale_meters": 0.05
    }
]"#;

struct SiteGeometryLoader {
    asset_base_url: String,
}

impl SiteGeometryLoader {
    fn new(asset_base_url: impl Into<String>) -> Self {
        Self {
            asset_base_url: asset_base_url.into(),
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_owned()
        } else {
            format!("{}/{url}", self.asset_base_url.trim_end_matches('/'))
        }
    }
}

impl GeometryLoader for SiteGeometryLoader {
    type Geometry = Bytes;

    fn load_geometry(&self, url: &str) -> BoxFuture<'static, Result<Bytes, LoadError>> {
        let resolved = self.resolve(url);
        Box::pin(async move {
            if resolved.starts_with("http://") || resolved.starts_with("https://") {
                let response = reqwest::get(&resolved)
                    .await
                    .map_err(|err| LoadError::new(&resolved, err))?
                    .bytes()
                    .await
                    .map_err(|err| LoadError::new(&resolved, err))?;
                if response.is_empty() {
                    return Err(LoadError::new(&resolved, "empty response body"));
                }
                Ok(response)
            } else {
                let data = tokio::fs::read(&resolved)
                    .await
                    .map_err(|err| LoadError::new(&resolved, err))?;
                Ok(Bytes::from(data))
            }
        })
    }
}

struct LoggingDrawQueue;

impl DrawQueue<Bytes> for LoggingDrawQueue {
    fn submit_draw(&mut self, geometry: &Bytes, model_to_clip: DMat4) {
        let anchor = model_to_clip.w_axis.truncate();
        log::debug!("Drawing {} bytes of geometry at {anchor}", geometry.len());
    }
}

fn build_view_proj_matrix(center: &MercatorCoordinate, angle: f64) -> DMat4 {
    let distance = 600.0 * center.meter_scale;
    let height = 400.0 * center.meter_scale;
    let eye = center.position() + DVec3::new(angle.cos() * distance, angle.sin() * distance, height);

    let projection = DMat4::perspective_rh(60f64.to_radians(), 16.0 / 9.0, 1e-9, 1.0);
    let view = DMat4::look_at_rh(eye, center.position(), DVec3::Z);
    projection * view
}

pub fn main() -> Result<()> {
    env_logger::init();

    let catalog: Vec<ModelDescriptor> = serde_json::from_str(MODEL_CATALOG)?;
    log::info!(
        "Placing site catalog: {}",
        catalog.iter().map(|descriptor| &descriptor.id).join(", ")
    );

    let mut placer = ModelPlacer::new(SiteGeometryLoader::new(env!("MAPMODEL_asset_base_url")));
    placer.set_failure_listener(|id, error| log::warn!("{id}: giving up, {error}"));

    for descriptor in catalog {
        placer.register(descriptor)?;
    }

    let background_runtime = Runtime::new()?;
    let spawner = |future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>| {
        background_runtime.spawn(future)
    };
    let host = HostContext::new(&spawner);
    if let Err(err) = placer.on_attach(&host) {
        log::error!("{err:?}");
    }

    let center = MercatorCoordinate::from_anchor(&GeoAnchor::new(SITE_CENTER.0, SITE_CENTER.1)?);

    // Headless frame loop standing in for a map host: orbit the site once
    // and exercise the visibility switches along the way.
    let mut queue = LoggingDrawQueue;
    for frame_index in 0..240usize {
        let angle = frame_index as f64 / 240.0 * std::f64::consts::TAU;
        let frame = FrameContext::new(build_view_proj_matrix(&center, angle));
        let submitted = placer.on_frame(&frame, &mut queue);

        if frame_index % 60 == 0 {
            log::info!("Frame {frame_index}: {submitted} models drawn");
        }
        match frame_index {
            120 => placer.set_visible(&"bench-model".into(), false)?,
            180 => placer.unregister(&"closet-model".into()),
            _ => {}
        }

        std::thread::sleep(Duration::from_millis(16));
    }

    placer.dispose();
    Ok(())
}
