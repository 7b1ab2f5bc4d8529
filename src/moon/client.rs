//! Moon-phase API client (RapidAPI)
//!
//! One GET per fetch, plus at most one retry after a rate-limit response.
//! Results are never cached; the caller governs how often to fetch.

use crate::config::Config;
use crate::constants::api::{MOON_API_HOST, MOON_API_URL};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::moon::{repair, MoonBackend, MoonData};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Moon-phase API client
#[derive(Debug, Clone)]
pub struct MoonDataClient {
    client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: String,
    backoff: Duration,
}

impl MoonDataClient {
    /// Create a client against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(MOON_API_URL, api_key)
    }

    /// Create a client against a specific base URL
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            host: MOON_API_HOST.to_string(),
            api_key: api_key.into(),
            backoff: Duration::from_secs(1),
        }
    }

    /// Create a client from the `[moon]` and `[api_keys]` sections
    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(&config.moon.base_url, &config.api_keys.moon)
            .with_host(&config.moon.host)
            .with_backoff(Duration::from_millis(config.moon.throttle_backoff_ms))
    }

    /// Override the x-rapidapi-host header
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the wait before the throttle retry
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn request(&self, coords: Coordinates) -> Result<reqwest::Response> {
        let url = format!(
            "{}/advanced?lat={}&lon={}",
            self.base_url, coords.lat, coords.lon
        );
        debug!(%url, "moon API request");

        self.client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await
            .map_err(|e| Error::Api(format!("Moon API request failed: {}", e)))
    }
}

impl MoonBackend for MoonDataClient {
    async fn fetch(&self, coords: Coordinates) -> Result<MoonData> {
        let mut response = self.request(coords).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                backoff_ms = self.backoff.as_millis() as u64,
                "moon API rate limited, retrying once"
            );
            tokio::time::sleep(self.backoff).await;

            response = self.request(coords).await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::ThrottleExceeded);
            }
        }

        if !response.status().is_success() {
            return Err(Error::Api(format!("API Error: {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Api(format!("Failed to read moon API response: {}", e)))?;

        repair::decode(&body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    /// Minimal payload that passes validation
    pub(crate) const VALID_BODY: &str = r#"{
        "timestamp": 1760860800,
        "moon": {
            "phase": 0.93,
            "phase_name": "Waning Crescent",
            "stage": "waning",
            "illumination": "7%",
            "age_days": 27,
            "zodiac": {"sun_sign": "Libra", "moon_sign": "Virgo"},
            "detailed": {"position": {"altitude": 12.5, "azimuth": 95.0, "distance": 384400, "parallactic_angle": -20.0}}
        },
        "moon_phases": {
            "new_moon": {"next": {"timestamp": 1761004800, "datestamp": "Tue, 21 Oct 2025", "days_ahead": 2}},
            "full_moon": {"next": {"timestamp": 1762300800, "datestamp": "Wed, 05 Nov 2025", "days_ahead": 17}}}}"#;

    fn client_for(server: &Server) -> MoonDataClient {
        MoonDataClient::with_base_url(server.url(), "test-key")
            .with_backoff(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_fetch_sends_coordinates_and_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/advanced")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "52.3676".into()),
                Matcher::UrlEncoded("lon".into(), "4.9041".into()),
            ]))
            .match_header("x-rapidapi-key", "test-key")
            .match_header("x-rapidapi-host", "moon-phase.p.rapidapi.com")
            .with_status(200)
            .with_body(VALID_BODY)
            .expect(1)
            .create_async()
            .await;

        let data = client_for(&server)
            .fetch(Coordinates::new(52.3676, 4.9041))
            .await
            .unwrap();

        assert_eq!(data.phase(), Some(0.93));
        assert_eq!(data.next_full_moon().unwrap().timestamp, Some(1_762_300_800));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_retry_after_throttle() {
        let mut server = Server::new_async().await;
        let throttled = server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(429)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(VALID_BODY)
            .expect(1)
            .create_async()
            .await;

        let data = client_for(&server)
            .fetch(Coordinates::new(0.0, 0.0))
            .await
            .unwrap();

        assert!(data.next_full_moon().is_some());
        throttled.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_throttle_gives_up() {
        let mut server = Server::new_async().await;
        let throttled = server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let result = client_for(&server).fetch(Coordinates::new(0.0, 0.0)).await;

        assert!(matches!(result, Err(Error::ThrottleExceeded)));
        // Exactly two requests, never a third
        throttled.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let result = client_for(&server).fetch(Coordinates::new(0.0, 0.0)).await;
        assert!(matches!(result, Err(Error::Api(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trailing_garbage_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!("{}\u{0}\u{0}<html>oops</html>", VALID_BODY))
            .create_async()
            .await;

        let data = client_for(&server)
            .fetch(Coordinates::new(0.0, 0.0))
            .await
            .unwrap();
        let direct = repair::decode(VALID_BODY).unwrap();
        assert_eq!(data, direct);
    }

    #[tokio::test]
    async fn test_body_without_structure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("You are not subscribed to this API.")
            .create_async()
            .await;

        let result = client_for(&server).fetch(Coordinates::new(0.0, 0.0)).await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_full_moon_is_validation_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/advanced")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"moon": {"phase": 0.5}, "moon_phases": {"new_moon": {}}}"#)
            .create_async()
            .await;

        let result = client_for(&server).fetch(Coordinates::new(0.0, 0.0)).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.moon.throttle_backoff_ms = 250;
        config.api_keys.moon = "abc".to_string();

        let client = MoonDataClient::from_config(&config);
        assert_eq!(client.backoff, Duration::from_millis(250));
        assert_eq!(client.api_key, "abc");
        assert_eq!(client.base_url, MOON_API_URL);
        assert_eq!(client.host, MOON_API_HOST);
    }
}
