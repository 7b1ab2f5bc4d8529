//! Session state: current location and the moon data for it
//!
//! `LocationStore` is the single source of truth the server and CLI read
//! from. It owns the coordinates, city name, loading flag, last error and
//! last moon snapshot, and coordinates the geocoder, the geolocation
//! provider and the moon backend whenever the location changes.
//!
//! Operations are not serialized against each other. Two overlapping
//! updates race and whichever finishes last wins. Locks are only held for
//! the duration of a field update, never across a request.

use crate::config::Config;
use crate::constants::geolocation::CURRENT_LOCATION_LABEL;
use crate::error::{Error, Result};
use crate::geo::browser::{BrowserLocationProvider, GeolocationPlatform};
use crate::geo::geocode_maps::GeocodeMapsBackend;
use crate::geo::ip_location::IpPlatform;
use crate::geo::{Coordinates, GeoBackend};
use crate::moon::client::MoonDataClient;
use crate::moon::{MoonBackend, MoonData};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// What happens to the displayed moon data while a refresh is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Keep showing the previous snapshot until a new one arrives
    #[default]
    Retain,
    /// Drop it as soon as the refresh starts
    Clear,
}

/// Status derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Snapshot of the session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationState {
    pub coordinates: Coordinates,
    pub city_name: String,
    pub loading: bool,
    /// User-facing message of the last failure
    pub error: Option<String>,
    pub moon_data: Option<MoonData>,
}

impl LocationState {
    pub fn new(coordinates: Coordinates, city_name: impl Into<String>) -> Self {
        Self {
            coordinates,
            city_name: city_name.into(),
            loading: false,
            error: None,
            moon_data: None,
        }
    }

    /// Loading wins over an error, an error over data
    pub fn status(&self) -> Status {
        if self.loading {
            Status::Loading
        } else if self.error.is_some() {
            Status::Failed
        } else if self.moon_data.is_some() {
            Status::Ready
        } else {
            Status::Idle
        }
    }
}

impl Default for LocationState {
    fn default() -> Self {
        let defaults = crate::config::LocationConfig::default();
        Self::new(Coordinates::new(defaults.lat, defaults.lon), defaults.city)
    }
}

/// Shared location and moon-data state
pub struct LocationStore<G, P, M> {
    geocoder: G,
    locator: BrowserLocationProvider<P>,
    moon: M,
    stale_policy: StalePolicy,
    state: RwLock<LocationState>,
}

/// Store wired to the real upstream services
pub type LiveStore = LocationStore<GeocodeMapsBackend, IpPlatform, MoonDataClient>;

impl LiveStore {
    /// Build a store from configuration
    pub fn from_config(config: &Config) -> Self {
        let geocoder =
            GeocodeMapsBackend::with_base_url(&config.geocode.base_url, &config.api_keys.geocode);
        let platform = IpPlatform::with_url(&config.location.ip_api_url)
            .enabled(config.location.geolocation);
        let initial = LocationState::new(
            Coordinates::new(config.location.lat, config.location.lon),
            &config.location.city,
        );
        let policy = if config.moon.clear_stale_on_refresh {
            StalePolicy::Clear
        } else {
            StalePolicy::Retain
        };

        LocationStore::new(
            geocoder,
            BrowserLocationProvider::new(platform),
            MoonDataClient::from_config(config),
        )
        .with_state(initial)
        .with_stale_policy(policy)
    }
}

impl<G, P, M> LocationStore<G, P, M>
where
    G: GeoBackend,
    P: GeolocationPlatform,
    M: MoonBackend,
{
    /// Create a store starting at the default location
    pub fn new(geocoder: G, locator: BrowserLocationProvider<P>, moon: M) -> Self {
        Self {
            geocoder,
            locator,
            moon,
            stale_policy: StalePolicy::default(),
            state: RwLock::new(LocationState::default()),
        }
    }

    /// Replace the initial state
    pub fn with_state(mut self, state: LocationState) -> Self {
        self.state = RwLock::new(state);
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> LocationState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> Status {
        self.state.read().await.status()
    }

    /// Move to a named city and fetch its moon data
    ///
    /// Coordinates and city name are committed as soon as geocoding
    /// succeeds; a failing moon fetch afterwards does not undo them.
    pub async fn update_location(&self, city: &str) -> Result<()> {
        let city = city.trim();
        if city.is_empty() {
            let err = Error::InvalidInput("City name is empty".to_string());
            self.state.write().await.error = Some(err.user_message());
            return Err(err);
        }

        self.begin_loading().await;

        let resolved = match self.geocoder.geocode(city).await {
            Ok(resolved) => resolved,
            Err(e) => return Err(self.fail(e).await),
        };

        {
            let mut state = self.state.write().await;
            state.coordinates = resolved.coordinates();
            state.city_name = if resolved.display_name.is_empty() {
                city.to_string()
            } else {
                resolved.display_name
            };
            info!(
                city = %state.city_name,
                lat = state.coordinates.lat,
                lon = state.coordinates.lon,
                "location updated"
            );
        }

        self.refresh_moon_data().await
    }

    /// Move to this host's current position and fetch its moon data
    ///
    /// The position is labelled by reverse geocoding when possible, with a
    /// generic label otherwise. Labelling never fails the operation.
    pub async fn request_browser_location(&self) -> Result<Coordinates> {
        self.begin_loading().await;

        let coords = match self.locator.get_current_location().await {
            Ok(coords) => coords,
            Err(e) => return Err(self.fail(e).await),
        };

        {
            let mut state = self.state.write().await;
            state.coordinates = coords;
            state.city_name = CURRENT_LOCATION_LABEL.to_string();
        }
        info!(lat = coords.lat, lon = coords.lon, "location updated from current position");

        match self.geocoder.reverse_geocode(coords).await {
            Ok(place) if !place.display_name.is_empty() => {
                let mut state = self.state.write().await;
                // A newer location may have landed meanwhile
                if state.coordinates == coords {
                    state.city_name = place.display_name;
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "reverse geocoding failed, keeping generic label"),
        }

        self.refresh_moon_data().await?;
        Ok(coords)
    }

    /// Fetch moon data for the current coordinates
    pub async fn refresh_moon_data(&self) -> Result<()> {
        let coords = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            if self.stale_policy == StalePolicy::Clear {
                state.moon_data = None;
            }
            state.coordinates
        };
        debug!(lat = coords.lat, lon = coords.lon, "refreshing moon data");

        match self.moon.fetch(coords).await {
            Ok(data) => {
                let mut state = self.state.write().await;
                state.moon_data = Some(data);
                state.loading = false;
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn begin_loading(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    /// Record a failure and hand the error back for propagation
    async fn fail(&self, err: Error) -> Error {
        warn!(error = %err, "location update failed");
        let mut state = self.state.write().await;
        state.error = Some(err.user_message());
        state.loading = false;
        err
    }
}
