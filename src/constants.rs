//! Centralized constants for the lunatrack crate

/// External API endpoints
pub mod api {
    /// geocode.maps.co forward/reverse geocoding
    pub const GEOCODE_URL: &str = "https://geocode.maps.co";

    /// RapidAPI moon-phase service
    pub const MOON_API_URL: &str = "https://moon-phase.p.rapidapi.com";

    /// Value of the `x-rapidapi-host` header
    pub const MOON_API_HOST: &str = "moon-phase.p.rapidapi.com";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Lunar geometry
pub mod lunar {
    /// Earth-moon distance at perigee, km
    pub const PERIGEE_KM: f64 = 363_104.0;

    /// Earth-moon distance at apogee, km
    pub const APOGEE_KM: f64 = 405_696.0;

    /// Apparent size lost between perigee and apogee, as a fraction of the base
    pub const SIZE_VARIATION: f64 = 0.2;
}

/// Geolocation request settings
pub mod geolocation {
    /// Bounded wait for a single position fix, seconds
    pub const POSITION_TIMEOUT_SECS: u64 = 10;

    /// Label used until reverse geocoding names the position
    pub const CURRENT_LOCATION_LABEL: &str = "Current Location";
}
