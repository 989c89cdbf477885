//! Region boundary rendering and map interaction.
//!
//! `engine` turns a GeoJSON-like feature collection into a projected scene
//! and marker positions; `view` holds the interaction controllers and the
//! composed [`MapView`].

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod view;

#[cfg(target_arch = "wasm32")]
mod bindings;

pub use config::{BoundaryConfig, EngineConfig};
pub use error::MapError;
pub use model::{
    BoundaryLoader, BoundarySource, Deal, DealPosition, Feature, FeatureCollection, GeoBounds,
    GeoPoint, MapResult, Region, ScreenPoint, ViewportSize,
};
pub use view::{CanvasController, Key, MapStyle, MapView, PointerTarget, SnapPanel};

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
