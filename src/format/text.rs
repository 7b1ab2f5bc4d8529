//! Human-readable text output formatter

use crate::error::Result;
use crate::format::{format_timestamp, OutputFormatter};
use crate::moon::{MoonData, PhaseEvent};
use crate::present::MoonView;
use crate::store::LocationState;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

fn event_line(event: &PhaseEvent) -> Option<String> {
    let when = event
        .timestamp
        .and_then(format_timestamp)
        .or_else(|| event.datestamp.clone())?;
    Some(match event.days_ahead {
        Some(days) => format!("{} (in {} days)", when, days),
        None => when,
    })
}

fn push_moon(output: &mut String, data: &MoonData) {
    let view = MoonView::from_moon_data(data);

    if let Some(moon) = &data.moon {
        output.push_str("\nMoon:\n");
        let phase_name = moon
            .phase_name
            .clone()
            .or_else(|| view.phase_image.map(|p| p.to_string()));
        if let Some(name) = phase_name {
            match &moon.emoji {
                Some(emoji) => output.push_str(&format!("  Phase: {} {}\n", name, emoji)),
                None => output.push_str(&format!("  Phase: {}\n", name)),
            }
        }
        if let Some(illumination) = view.illumination {
            output.push_str(&format!("  Illumination: {}%\n", illumination));
        }
        if let Some(stage) = view.stage {
            output.push_str(&format!("  Stage: {:?}\n", stage));
        }
        if let Some(age) = moon.age_days {
            output.push_str(&format!("  Age: {} days\n", age));
        }
        if let Some(sign) = moon.zodiac.as_ref().and_then(|z| z.moon_sign.as_deref()) {
            output.push_str(&format!("  Zodiac: {}\n", sign));
        }
        if let Some(rise) = &moon.moonrise {
            output.push_str(&format!("  Moonrise: {}\n", rise));
        }
        if let Some(set) = &moon.moonset {
            output.push_str(&format!("  Moonset: {}\n", set));
        }
        if let Some(size) = view.apparent_size {
            output.push_str(&format!("  Apparent size: {}px\n", size));
        }
    }

    if let Some(phases) = &data.moon_phases {
        output.push_str("\nUpcoming phases:\n");
        for (label, window) in phases.windows() {
            if let Some(line) = window.and_then(|w| w.next.as_ref()).and_then(event_line) {
                output.push_str(&format!("  {}: {}\n", label, line));
            }
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, state: &LocationState) -> Result<String> {
        let mut output = String::new();

        // Header
        output.push_str(&format!("lunatrack: {}\n", state.city_name));
        output.push_str(&format!(
            "Coordinates: ({:.4}, {:.4})\n",
            state.coordinates.lat, state.coordinates.lon
        ));

        if let Some(error) = &state.error {
            output.push_str(&format!("Error: {}\n", error));
        }

        if let Some(data) = &state.moon_data {
            push_moon(&mut output, data);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_moon;

    #[test]
    fn test_text_format() {
        let mut state = LocationState::default();
        state.moon_data = Some(sample_moon());

        let output = TextFormatter.format(&state).unwrap();

        assert!(output.starts_with("lunatrack: Amsterdam\n"));
        assert!(output.contains("Coordinates: (52.3676, 4.9041)"));
        assert!(output.contains("Phase: Waning Crescent"));
        assert!(output.contains("Illumination: 7%"));
        assert!(output.contains("Stage: Waning"));
        assert!(output.contains("Zodiac: Virgo"));
        assert!(output.contains("Apparent size: 58px"));
        assert!(output.contains("Full moon: Wed, 05 Nov 2025 00:00 UTC (in 17 days)"));
        assert!(output.contains("New moon: Tue, 21 Oct 2025 00:00 UTC (in 2 days)"));
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn test_text_format_error_without_data() {
        let mut state = LocationState::default();
        state.error = Some("Please enter a valid city name".to_string());

        let output = TextFormatter.format(&state).unwrap();
        assert!(output.contains("Error: Please enter a valid city name"));
        assert!(!output.contains("Moon:"));
    }

    #[test]
    fn test_event_falls_back_to_datestamp() {
        let event = PhaseEvent {
            datestamp: Some("Mon, 29 Dec 2025".to_string()),
            ..PhaseEvent::default()
        };
        assert_eq!(event_line(&event).as_deref(), Some("Mon, 29 Dec 2025"));
        assert_eq!(event_line(&PhaseEvent::default()), None);
    }

    #[test]
    fn test_text_formatter_info() {
        let formatter = TextFormatter;
        assert_eq!(formatter.name(), "text");
        assert!(!formatter.description().is_empty());
    }
}
