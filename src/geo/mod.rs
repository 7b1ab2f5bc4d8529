//! Location resolution
//!
//! Forward/reverse geocoding of city names and position fixes from the
//! host's geolocation capability.

pub mod browser;
pub mod geocode_maps;
pub mod ip_location;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidInput(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::InvalidInput(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

/// A geocoded location result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    /// "Locality, Country" or whatever the upstream could offer
    pub display_name: String,
}

impl GeocodeResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Resolve a city name to its first match
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Result<GeocodeResult>> + Send;

    /// Name the place at the given coordinates
    fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> impl std::future::Future<Output = Result<GeocodeResult>> + Send;
}

/// Short display name from a geocoder's full address
///
/// Keeps the first (locality) and last (country) comma-separated segments
/// of `display_name`. Falls back to `name`, then to an empty string.
pub fn derive_display_name(display_name: Option<&str>, name: Option<&str>) -> String {
    if let Some(full) = display_name.filter(|s| !s.trim().is_empty()) {
        let segments: Vec<&str> = full
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        return match segments.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, .., last] => format!("{}, {}", first, last),
        };
    }

    name.map(|n| n.trim().to_string()).unwrap_or_default()
}
