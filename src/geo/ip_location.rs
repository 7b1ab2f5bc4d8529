//! IP-based geolocation platform
//!
//! Locates this host through ip-api.com. Every request is fresh (no cache),
//! and the service has no notion of permissions.

use crate::constants::api::IP_API_URL;
use crate::geo::browser::{GeolocationPlatform, PermissionState, PositionError, PositionOptions};
use crate::geo::Coordinates;
use serde::Deserialize;
use tracing::debug;

/// ip-api.com geolocation platform
#[derive(Debug, Clone)]
pub struct IpPlatform {
    client: reqwest::Client,
    url: String,
    enabled: bool,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpPlatform {
    /// Create a platform against the public endpoint
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    /// Create a platform against a specific endpoint
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            enabled: true,
        }
    }

    /// Enable or disable the capability
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for IpPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationPlatform for IpPlatform {
    fn is_supported(&self) -> bool {
        self.enabled
    }

    async fn query_permission(&self) -> Option<PermissionState> {
        None
    }

    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        debug!(url = %self.url, high_accuracy = options.enable_high_accuracy, "IP location request");

        let response = self
            .client
            .get(&self.url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PositionError::Timeout
                } else {
                    PositionError::PositionUnavailable
                }
            })?;

        if !response.status().is_success() {
            return Err(PositionError::PositionUnavailable);
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| PositionError::Other(format!("Failed to parse IP location response: {}", e)))?;

        if data.status != "success" {
            debug!(message = ?data.message, "IP location lookup failed");
            return Err(PositionError::PositionUnavailable);
        }

        match (data.lat, data.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(PositionError::PositionUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geo::browser::BrowserLocationProvider;
    use mockito::Server;

    #[tokio::test]
    async fn test_locates_host() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/json")
            .with_status(200)
            .with_body(r#"{"status": "success", "lat": 52.3759, "lon": 4.8975, "city": "Amsterdam"}"#)
            .create_async()
            .await;

        let platform = IpPlatform::with_url(format!("{}/json", server.url()));
        let coords = platform
            .current_position(PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(coords, Coordinates::new(52.3759, 4.8975));
    }

    #[tokio::test]
    async fn test_failed_lookup_is_unavailable() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/json")
            .with_status(200)
            .with_body(r#"{"status": "fail", "message": "reserved range"}"#)
            .create_async()
            .await;

        let provider =
            BrowserLocationProvider::new(IpPlatform::with_url(format!("{}/json", server.url())));
        assert!(matches!(
            provider.get_current_location().await,
            Err(Error::PositionUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_disabled_platform_is_unsupported() {
        let provider = BrowserLocationProvider::new(IpPlatform::new().enabled(false));
        assert!(matches!(
            provider.get_current_location().await,
            Err(Error::Unsupported)
        ));
    }

    #[tokio::test]
    async fn test_no_permission_capability() {
        assert_eq!(IpPlatform::new().query_permission().await, None);
    }
}
