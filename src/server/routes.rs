//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::format::Report;
use crate::geo::browser::GeolocationPlatform;
use crate::geo::GeoBackend;
use crate::moon::MoonBackend;
use crate::present::PhaseImage;
use crate::server::error::{not_found, ApiError};
use crate::server::state::AppState;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Locate the static assets directory
///
/// Tries the working directory first, then next to the executable.
fn static_dir() -> PathBuf {
    let local = PathBuf::from("static");
    if local.exists() {
        return local;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// Create the API router
pub fn create_router<G, P, M>(state: Arc<AppState<G, P, M>>) -> Router
where
    G: GeoBackend + 'static,
    P: GeolocationPlatform + 'static,
    M: MoonBackend + 'static,
{
    Router::new()
        .route("/api/moon", get(moon_handler::<G, P, M>))
        .route("/api/location", post(location_handler::<G, P, M>))
        .route(
            "/api/location/current",
            post(current_location_handler::<G, P, M>),
        )
        .route("/api/phase-image", get(phase_image_handler))
        .nest_service("/static", ServeDir::new(static_dir()))
        .fallback(not_found)
        .with_state(state)
}

/// Query for the moon endpoint
#[derive(Debug, Default, Deserialize)]
pub struct MoonQuery {
    /// Fetch fresh data before answering
    #[serde(default)]
    pub refresh: bool,
}

/// Current snapshot
///
/// GET /api/moon[?refresh=true]
async fn moon_handler<G, P, M>(
    State(state): State<Arc<AppState<G, P, M>>>,
    query: Result<Query<MoonQuery>, QueryRejection>,
) -> Result<Json<Report>, ApiError>
where
    G: GeoBackend,
    P: GeolocationPlatform,
    M: MoonBackend,
{
    let Query(query) =
        query.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    if query.refresh {
        state.store.refresh_moon_data().await?;
    }

    Ok(Json(Report::from_state(&state.store.snapshot().await)))
}

/// Location update request body
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationRequest {
    pub city: String,
}

/// Move to a named city
///
/// POST /api/location
async fn location_handler<G, P, M>(
    State(state): State<Arc<AppState<G, P, M>>>,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> Result<Json<Report>, ApiError>
where
    G: GeoBackend,
    P: GeolocationPlatform,
    M: MoonBackend,
{
    let Json(req) = payload.map_err(|e| ApiError::new(e.status(), e.body_text()))?;

    state.store.update_location(&req.city).await?;

    Ok(Json(Report::from_state(&state.store.snapshot().await)))
}

/// Move to the server's current position
///
/// POST /api/location/current
async fn current_location_handler<G, P, M>(
    State(state): State<Arc<AppState<G, P, M>>>,
) -> Result<Json<Report>, ApiError>
where
    G: GeoBackend,
    P: GeolocationPlatform,
    M: MoonBackend,
{
    state.store.request_browser_location().await?;

    Ok(Json(Report::from_state(&state.store.snapshot().await)))
}

/// Query for the phase image endpoint
#[derive(Debug, Deserialize)]
pub struct PhaseQuery {
    pub phase: f64,
}

/// Phase image response
#[derive(Debug, Serialize, Deserialize)]
pub struct PhaseImageResponse {
    pub slug: PhaseImage,
    pub image: String,
}

/// Image for an arbitrary phase value
///
/// GET /api/phase-image?phase=0.5
async fn phase_image_handler(
    query: Result<Query<PhaseQuery>, QueryRejection>,
) -> Result<Json<PhaseImageResponse>, ApiError> {
    let Query(query) =
        query.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
    let image = PhaseImage::from_phase(query.phase);

    Ok(Json(PhaseImageResponse {
        slug: image,
        image: image.image_path(),
    }))
}
