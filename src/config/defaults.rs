//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default latitude (Amsterdam)
pub const DEFAULT_LAT: f64 = 52.3676;

/// Default longitude (Amsterdam)
pub const DEFAULT_LON: f64 = 4.9041;

/// Default city display name
pub const DEFAULT_CITY: &str = "Amsterdam";

/// Backoff before the single retry after a rate-limit response
pub const DEFAULT_THROTTLE_BACKOFF_MS: u64 = 1000;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "lunatrack";

/// Environment variable overriding `api_keys.moon`
pub const MOON_API_KEY_ENV: &str = "LUNATRACK_MOON_API_KEY";

/// Environment variable overriding `api_keys.geocode`
pub const GEOCODE_API_KEY_ENV: &str = "LUNATRACK_GEOCODE_API_KEY";
