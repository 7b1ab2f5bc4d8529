//! Server shared state
//!
//! One store per process: every client sees and mutates the same session.

use crate::config::Config;
use crate::geo::geocode_maps::GeocodeMapsBackend;
use crate::geo::ip_location::IpPlatform;
use crate::moon::client::MoonDataClient;
use crate::store::{LiveStore, LocationStore};

/// Shared state for the HTTP server
pub struct AppState<G, P, M> {
    /// Configuration
    pub config: Config,

    /// Location and moon data shown to every client
    pub store: LocationStore<G, P, M>,
}

/// State wired to the real upstream services
pub type LiveState = AppState<GeocodeMapsBackend, IpPlatform, MoonDataClient>;

impl<G, P, M> AppState<G, P, M> {
    /// Create new application state
    pub fn new(config: Config, store: LocationStore<G, P, M>) -> Self {
        Self { config, store }
    }
}

impl LiveState {
    /// Build the store from configuration
    pub fn from_config(config: Config) -> Self {
        let store = LiveStore::from_config(&config);
        Self::new(config, store)
    }
}
