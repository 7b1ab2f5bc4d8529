//! Error types for lunatrack

use thiserror::Error;

/// Main error type for lunatrack operations
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected locally, no request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream returned zero results
    #[error("Not found: {0}")]
    NotFound(String),

    /// Geocoding request failed or returned a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Moon API request failed or returned a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Body could not be recovered as structured data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Structurally valid but missing required fields
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded after retry")]
    ThrottleExceeded,

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location request timed out")]
    Timeout,

    #[error("Location information is unavailable")]
    PositionUnavailable,

    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Geolocation error: {0}")]
    Unknown(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Message recorded in the shared error slot and shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(_) => "Please enter a valid city name".to_string(),
            Error::NotFound(_) => "No location found for the specified city.".to_string(),
            Error::ThrottleExceeded => {
                "The moon service is busy. Please try again in a moment.".to_string()
            }
            Error::PermissionDenied => {
                "Location access was denied. Please enable it in your browser settings."
                    .to_string()
            }
            Error::Timeout => "Location request timed out. Please try again.".to_string(),
            Error::PositionUnavailable => {
                "Location information is unavailable. Please try again.".to_string()
            }
            Error::Unsupported => "Geolocation is not supported by your browser".to_string(),
            Error::Unknown(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status used when this error reaches the API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::NotFound(_) => 404,
            Error::PermissionDenied => 403,
            Error::ThrottleExceeded => 429,
            Error::Unsupported => 501,
            Error::Transport(_) | Error::Api(_) | Error::Parse(_) | Error::Validation(_) => 502,
            Error::PositionUnavailable => 503,
            Error::Timeout => 504,
            _ => 500,
        }
    }
}

/// Result type alias for lunatrack operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            Error::InvalidInput("blank".into()).user_message(),
            "Please enter a valid city name"
        );
        assert_eq!(
            Error::Unknown("platform exploded".into()).user_message(),
            "platform exploded"
        );
        assert_eq!(
            Error::Parse("no valid JSON structure found".into()).user_message(),
            "Parse error: no valid JSON structure found"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidInput(String::new()).status_code(), 400);
        assert_eq!(Error::NotFound(String::new()).status_code(), 404);
        assert_eq!(Error::ThrottleExceeded.status_code(), 429);
        assert_eq!(Error::Validation(String::new()).status_code(), 502);
        assert_eq!(Error::Timeout.status_code(), 504);
        assert_eq!(Error::Config(String::new()).status_code(), 500);
    }
}
