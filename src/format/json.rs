//! JSON output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, Report};
use crate::store::LocationState;

/// JSON formatter - outputs the snapshot report as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Snapshot with moon data and display values"
    }

    fn format(&self, state: &LocationState) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Report::from_state(state))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_moon;

    #[test]
    fn test_json_format() {
        let mut state = LocationState::default();
        state.moon_data = Some(sample_moon());

        let output = JsonFormatter.format(&state).unwrap();

        // Verify it's valid JSON
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "ready");
        assert_eq!(parsed["city_name"], "Amsterdam");
        assert_eq!(parsed["coordinates"]["lat"], 52.3676);
        assert_eq!(parsed["moon"]["moon"]["phase"], 0.93);
        assert_eq!(parsed["view"]["phase_image"], "waning-crescent");
        assert!(parsed["error"].is_null());
    }

    #[test]
    fn test_json_format_with_error() {
        let mut state = LocationState::default();
        state.error = Some("No location found for the specified city.".to_string());

        let output = JsonFormatter.format(&state).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "failed");
        assert!(parsed["moon"].is_null());
        assert!(parsed["view"].is_null());
    }

    #[test]
    fn test_json_formatter_info() {
        let formatter = JsonFormatter;
        assert_eq!(formatter.name(), "json");
        assert!(!formatter.description().is_empty());
    }
}
