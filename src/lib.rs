//! lunatrack: moon phase lookups by city or current location
//!
//! A library and CLI tool that resolves a location (typed city name or the
//! host's current position), fetches lunar data for it from a third-party
//! moon-phase API and derives display values from the result.
//!
//! ## Features
//!
//! - Forward and reverse geocoding (geocode.maps.co)
//! - Current-position lookups behind a pluggable geolocation platform
//! - Moon-phase API client with a single throttle retry and body repair
//! - Shared location store with loading/error state
//! - Phase image, apparent size and terminator mask helpers
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use lunatrack::present::{apparent_size, PhaseImage, DEFAULT_BASE_SIZE};
//!
//! let image = PhaseImage::from_phase(0.5);
//! assert_eq!(image.image_path(), "/images/moon-phase-images/full-moon.png");
//!
//! // Closer moon, bigger disc
//! assert_eq!(apparent_size(363_104.0, DEFAULT_BASE_SIZE), 64.0);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geo;
pub mod moon;
pub mod present;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{Coordinates, GeoBackend, GeocodeResult};
pub use moon::{MoonBackend, MoonData};
pub use store::{LiveStore, LocationState, LocationStore, StalePolicy, Status};
