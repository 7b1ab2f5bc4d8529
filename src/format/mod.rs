//! Output formatters
//!
//! Render a store snapshot for the CLI. The JSON formatter emits the same
//! `Report` shape the HTTP API serves.

pub mod json;
pub mod text;

use crate::error::Result;
use crate::geo::Coordinates;
use crate::moon::MoonData;
use crate::present::MoonView;
use crate::store::{LocationState, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Snapshot plus derived display values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub status: Status,
    pub coordinates: Coordinates,
    pub city_name: String,
    pub loading: bool,
    pub error: Option<String>,
    pub moon: Option<MoonData>,
    pub view: Option<MoonView>,
}

impl Report {
    pub fn from_state(state: &LocationState) -> Self {
        Self {
            status: state.status(),
            coordinates: state.coordinates,
            city_name: state.city_name.clone(),
            loading: state.loading,
            error: state.error.clone(),
            view: state.moon_data.as_ref().map(MoonView::from_moon_data),
            moon: state.moon_data.clone(),
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a store snapshot
    fn format(&self, state: &LocationState) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        &json::JsonFormatter as &dyn OutputFormatter,
        &text::TextFormatter,
    ]
    .iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}

/// Render a unix timestamp as a UTC date and time
pub fn format_timestamp(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_moon;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 2);
        assert!(formats.iter().any(|f| f.name == "json"));
        assert!(formats.iter().any(|f| f.name == "text"));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_762_300_800).as_deref(),
            Some("Wed, 05 Nov 2025 00:00 UTC")
        );
        assert_eq!(format_timestamp(i64::MAX), None);
    }

    #[test]
    fn test_report_from_state() {
        let mut state = LocationState::default();
        let report = Report::from_state(&state);
        assert_eq!(report.status, Status::Idle);
        assert!(report.view.is_none());

        state.moon_data = Some(sample_moon());
        let report = Report::from_state(&state);
        assert_eq!(report.status, Status::Ready);
        let view = report.view.unwrap();
        assert_eq!(view.apparent_size, Some(58.0));
        assert_eq!(
            view.image_path.as_deref(),
            Some("/images/moon-phase-images/waning-crescent-moon.png")
        );
    }
}
