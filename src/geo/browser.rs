//! Current-position lookups
//!
//! Wraps a platform geolocation capability: capability check, best-effort
//! permission probe, then a single bounded position request. Failures are
//! classified into the crate error taxonomy. Nothing here touches shared
//! state; the store decides what to do with the fix.

use crate::constants::geolocation::POSITION_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Answer of a permission query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Bounded wait for the fix
    pub timeout: Duration,
    /// Oldest cached fix the platform may return; zero means always fresh
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(POSITION_TIMEOUT_SECS),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Failure reported by the platform itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(String),
}

impl From<PositionError> for Error {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => Error::PermissionDenied,
            PositionError::PositionUnavailable => Error::PositionUnavailable,
            PositionError::Timeout => Error::Timeout,
            PositionError::Other(msg) => Error::Unknown(msg),
        }
    }
}

/// A host capability able to produce position fixes
pub trait GeolocationPlatform: Send + Sync {
    /// Whether a position can be requested at all in this context
    fn is_supported(&self) -> bool;

    /// Probe the permission without prompting
    ///
    /// `None` when the platform cannot answer (no such capability, or the
    /// query itself failed).
    fn query_permission(&self) -> impl Future<Output = Option<PermissionState>> + Send;

    /// Request one position fix
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = std::result::Result<Coordinates, PositionError>> + Send;
}

/// Single-shot current-location provider
#[derive(Debug)]
pub struct BrowserLocationProvider<P> {
    platform: Option<P>,
    options: PositionOptions,
}

impl<P: GeolocationPlatform> BrowserLocationProvider<P> {
    /// Create a provider on top of a platform capability
    pub fn new(platform: P) -> Self {
        Self {
            platform: Some(platform),
            options: PositionOptions::default(),
        }
    }

    /// A provider for contexts with no geolocation capability at all
    pub fn unsupported() -> Self {
        Self {
            platform: None,
            options: PositionOptions::default(),
        }
    }

    /// Override the request options
    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> PositionOptions {
        self.options
    }

    /// Get the current position
    ///
    /// Fails with `Unsupported`, `PermissionDenied`, `Timeout`,
    /// `PositionUnavailable` or `Unknown`.
    pub async fn get_current_location(&self) -> Result<Coordinates> {
        let platform = match &self.platform {
            Some(p) if p.is_supported() => p,
            _ => return Err(Error::Unsupported),
        };

        match platform.query_permission().await {
            Some(PermissionState::Denied) => return Err(Error::PermissionDenied),
            Some(state) => debug!(?state, "geolocation permission"),
            None => debug!("permission query unavailable, requesting position directly"),
        }

        // Also bound the wait here in case the platform ignores the option
        let coords = tokio::time::timeout(
            self.options.timeout,
            platform.current_position(self.options),
        )
        .await
        .map_err(|_| Error::Timeout)??;

        if coords.validate().is_err() {
            return Err(Error::PositionUnavailable);
        }

        Ok(coords)
    }
}
