//! geocode.maps.co geocoding backend
//!
//! Single attempt per call, no caching. The caller decides whether to retry.

use crate::constants::api::GEOCODE_URL;
use crate::error::{Error, Result};
use crate::geo::{derive_display_name, Coordinates, GeoBackend, GeocodeResult};
use serde::Deserialize;
use tracing::debug;

/// geocode.maps.co backend
#[derive(Debug, Clone)]
pub struct GeocodeMapsBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// One entry of a search response, or the body of a reverse lookup
#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    lat: Option<String>,
    lon: Option<String>,
    display_name: Option<String>,
    name: Option<String>,
}

impl GeocodeMapsBackend {
    /// Create a backend against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(GEOCODE_URL, api_key)
    }

    /// Create a backend against a specific base URL
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Parse lat/lon strings to f64
    fn parse_coords(lat: &str, lon: &str) -> Result<Coordinates> {
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("Invalid latitude: {}", lat)))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("Invalid longitude: {}", lon)))?;
        Ok(Coordinates::new(lat, lon))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        // Path only, the query carries the key
        debug!(endpoint = url.split('?').next().unwrap_or_default(), "geocode request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Geocode request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "Geocode API returned status: {}",
                response.status()
            )));
        }

        Ok(response)
    }
}

impl GeoBackend for GeocodeMapsBackend {
    async fn geocode(&self, query: &str) -> Result<GeocodeResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("City name is empty".to_string()));
        }

        let url = format!(
            "{}/search?q={}&api_key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        );

        let results: Vec<GeocodeEntry> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse geocode response: {}", e)))?;

        let first = results.into_iter().next().ok_or_else(|| {
            Error::NotFound(format!("No location found for '{}'", query))
        })?;

        let (Some(lat), Some(lon)) = (first.lat.as_deref(), first.lon.as_deref()) else {
            return Err(Error::Parse("Geocode result has no coordinates".to_string()));
        };
        let coords = Self::parse_coords(lat, lon)?;
        // Out-of-range coordinates are an upstream fault, not bad user input
        coords
            .validate()
            .map_err(|_| Error::Parse(format!("Geocode result out of range: ({}, {})", lat, lon)))?;

        Ok(GeocodeResult {
            lat: coords.lat,
            lon: coords.lon,
            display_name: derive_display_name(
                first.display_name.as_deref(),
                first.name.as_deref(),
            ),
        })
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<GeocodeResult> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&api_key={}",
            self.base_url,
            coords.lat,
            coords.lon,
            urlencoding::encode(&self.api_key)
        );

        let entry: GeocodeEntry = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Failed to parse reverse geocode response: {}", e)))?;

        let display_name = derive_display_name(entry.display_name.as_deref(), entry.name.as_deref());
        if display_name.is_empty() {
            return Err(Error::NotFound(format!(
                "No place name for ({}, {})",
                coords.lat, coords.lon
            )));
        }

        let resolved = match (entry.lat.as_deref(), entry.lon.as_deref()) {
            (Some(lat), Some(lon)) => Self::parse_coords(lat, lon).unwrap_or(coords),
            _ => coords,
        };

        Ok(GeocodeResult {
            lat: resolved.lat,
            lon: resolved.lon,
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_parse_coords() {
        let coords = GeocodeMapsBackend::parse_coords("48.8534951", "2.3483915").unwrap();
        assert!((coords.lat - 48.8534951).abs() < 1e-9);
        assert!((coords.lon - 2.3483915).abs() < 1e-9);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(GeocodeMapsBackend::parse_coords("north", "0").is_err());
        assert!(GeocodeMapsBackend::parse_coords("0", "").is_err());
    }

    #[tokio::test]
    async fn test_geocode_first_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "São Paulo".into()),
                Matcher::UrlEncoded("api_key".into(), "secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"lat": "-23.5506507", "lon": "-46.6333824", "display_name": "São Paulo, Região Sudeste, Brasil"},
                    {"lat": "1.0", "lon": "1.0", "display_name": "Elsewhere"}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "secret");
        let result = backend.geocode("  São Paulo ").await.unwrap();

        assert!((result.lat + 23.5506507).abs() < 1e-9);
        assert!((result.lon + 46.6333824).abs() < 1e-9);
        assert_eq!(result.display_name, "São Paulo, Brasil");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_geocode_blank_input_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "secret");
        assert!(matches!(backend.geocode("").await, Err(Error::InvalidInput(_))));
        assert!(matches!(backend.geocode("   ").await, Err(Error::InvalidInput(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_geocode_empty_results() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "secret");
        assert!(matches!(
            backend.geocode("Atlantis").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_geocode_http_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "");
        assert!(matches!(
            backend.geocode("Berlin").await,
            Err(Error::Transport(_))
        ));
        // Single attempt, no retry
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_geocode_name_fallback() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"lat": "35.6812", "lon": "139.7671", "name": "Tokyo"}]"#)
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "k");
        let result = backend.geocode("Tokyo").await.unwrap();
        assert_eq!(result.display_name, "Tokyo");
    }

    #[tokio::test]
    async fn test_geocode_out_of_range_result() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"lat": "123.0", "lon": "4.9", "display_name": "Nowhere, Void"}]"#)
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "k");
        let err = backend.geocode("Nowhere").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)), "{:?}", err);
        assert_ne!(err.user_message(), "Please enter a valid city name");
    }

    #[tokio::test]
    async fn test_reverse_geocode() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "52.37".into()),
                Matcher::UrlEncoded("lon".into(), "4.89".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"lat": "52.3700", "lon": "4.8900", "display_name": "Dam, Centrum, Amsterdam, Noord-Holland, Nederland"}"#,
            )
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "k");
        let result = backend
            .reverse_geocode(Coordinates::new(52.37, 4.89))
            .await
            .unwrap();
        assert_eq!(result.display_name, "Dam, Nederland");
    }

    #[tokio::test]
    async fn test_reverse_geocode_without_name() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "Unable to geocode"}"#)
            .create_async()
            .await;

        let backend = GeocodeMapsBackend::with_base_url(server.url(), "k");
        assert!(matches!(
            backend.reverse_geocode(Coordinates::new(0.0, 0.0)).await,
            Err(Error::NotFound(_))
        ));
    }
}
