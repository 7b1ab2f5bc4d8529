//! Moon-phase data
//!
//! Normalized records of the moon-phase API response. The upstream shape is
//! loose and has changed across versions, so every leaf is optional and
//! unknown fields are ignored. Consumers must tolerate any field missing.
//!
//! The only guaranteed field after a successful fetch is the canonical
//! next-full-moon event at `moon_phases.full_moon.next`.

pub mod client;
pub mod repair;

use crate::error::Result;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Trait for moon-data sources
pub trait MoonBackend: Send + Sync {
    /// Fetch a fresh snapshot for the given coordinates
    fn fetch(&self, coords: Coordinates) -> impl Future<Output = Result<MoonData>> + Send;
}

/// Tolerant leaf decoding
///
/// Every leaf of the payload is optional and the upstream is loose about
/// types, so a value of the wrong type decodes as `None` instead of failing
/// the whole record.
mod de {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Any nested record; a malformed one becomes `None`
    pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// Strings, with numbers and booleans kept as their text
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Numbers, or numeric strings such as "45" or "45%"
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
            _ => None,
        }
        .filter(|v: &f64| v.is_finite()))
    }

    /// Unix seconds as an integer, float or numeric string
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = |f: f64| f.is_finite().then(|| f.trunc() as i64);
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(seconds)),
            Value::String(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse().ok().and_then(seconds))
            }
            _ => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => Some(b),
            _ => None,
        })
    }
}

/// Snapshot of the moon-phase API for one place and time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonData {
    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub datestamp: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub plan: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub sun: Option<SunData>,
    #[serde(deserialize_with = "de::lenient")]
    pub moon: Option<MoonInfo>,
    /// Canonical location of the upcoming/previous phase events
    #[serde(deserialize_with = "de::lenient")]
    pub moon_phases: Option<MoonPhases>,
    #[serde(deserialize_with = "de::lenient")]
    pub location: Option<ApiLocation>,
}

impl MoonData {
    /// Next full moon, read from the canonical path
    pub fn next_full_moon(&self) -> Option<&PhaseEvent> {
        self.moon_phases.as_ref()?.full_moon.as_ref()?.next.as_ref()
    }

    /// Phase fraction in [0, 1), if reported
    pub fn phase(&self) -> Option<f64> {
        self.moon.as_ref()?.phase
    }
}

/// One occurrence of a principal phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseEvent {
    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub datestamp: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub days_ago: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub days_ahead: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub description: Option<String>,
}

/// Previous and next occurrence of a phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseWindow {
    #[serde(deserialize_with = "de::lenient")]
    pub last: Option<PhaseEvent>,
    #[serde(deserialize_with = "de::lenient")]
    pub next: Option<PhaseEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonPhases {
    #[serde(deserialize_with = "de::lenient")]
    pub new_moon: Option<PhaseWindow>,
    #[serde(deserialize_with = "de::lenient")]
    pub first_quarter: Option<PhaseWindow>,
    #[serde(deserialize_with = "de::lenient")]
    pub full_moon: Option<PhaseWindow>,
    #[serde(deserialize_with = "de::lenient")]
    pub last_quarter: Option<PhaseWindow>,
}

impl MoonPhases {
    /// Principal phases in cycle order, with their display labels
    pub fn windows(&self) -> [(&'static str, Option<&PhaseWindow>); 4] {
        [
            ("New moon", self.new_moon.as_ref()),
            ("First quarter", self.first_quarter.as_ref()),
            ("Full moon", self.full_moon.as_ref()),
            ("Last quarter", self.last_quarter.as_ref()),
        ]
    }
}

/// Altitude/azimuth position of a body, degrees and km
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyPosition {
    #[serde(deserialize_with = "de::number")]
    pub altitude: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub azimuth: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub distance: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub parallactic_angle: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub phase_angle: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Eclipse {
    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub datestamp: Option<String>,
    #[serde(rename = "type", deserialize_with = "de::text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub visibility_regions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunData {
    #[serde(deserialize_with = "de::timestamp")]
    pub sunrise: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub sunrise_timestamp: Option<String>,
    #[serde(deserialize_with = "de::timestamp")]
    pub sunset: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub sunset_timestamp: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub solar_noon: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub day_length: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub position: Option<SkyPosition>,
    #[serde(deserialize_with = "de::lenient")]
    pub next_solar_eclipse: Option<Eclipse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zodiac {
    #[serde(deserialize_with = "de::text")]
    pub sun_sign: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub moon_sign: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonInfo {
    /// Position in the lunar cycle, 0 = new, 0.5 = full
    #[serde(deserialize_with = "de::number")]
    pub phase: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub phase_name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub major_phase: Option<String>,
    /// "waxing" or "waning"
    #[serde(deserialize_with = "de::text")]
    pub stage: Option<String>,
    /// Lit percentage of the disc, e.g. "45%"
    #[serde(deserialize_with = "de::text")]
    pub illumination: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub age_days: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub lunar_cycle: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub emoji: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub zodiac: Option<Zodiac>,
    #[serde(deserialize_with = "de::text")]
    pub moonrise: Option<String>,
    #[serde(deserialize_with = "de::timestamp")]
    pub moonrise_timestamp: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub moonset: Option<String>,
    #[serde(deserialize_with = "de::timestamp")]
    pub moonset_timestamp: Option<i64>,
    #[serde(deserialize_with = "de::lenient")]
    pub next_lunar_eclipse: Option<Eclipse>,
    #[serde(deserialize_with = "de::lenient")]
    pub detailed: Option<MoonDetail>,
    #[serde(deserialize_with = "de::lenient")]
    pub events: Option<MoonEvents>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonDetail {
    #[serde(deserialize_with = "de::lenient")]
    pub position: Option<SkyPosition>,
    #[serde(deserialize_with = "de::lenient")]
    pub visibility: Option<Visibility>,
    /// Legacy location of the phase events
    #[serde(deserialize_with = "de::lenient")]
    pub upcoming_phases: Option<MoonPhases>,
    #[serde(deserialize_with = "de::lenient")]
    pub illumination_details: Option<IlluminationDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    #[serde(deserialize_with = "de::number")]
    pub visible_hours: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub best_viewing_time: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub visibility_rating: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub illumination: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub viewing_conditions: Option<ViewingConditions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewingConditions {
    #[serde(deserialize_with = "de::text")]
    pub phase_quality: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub recommended_equipment: Option<Equipment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    #[serde(deserialize_with = "de::text")]
    pub filters: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub telescope: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub best_magnification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IlluminationDetails {
    #[serde(deserialize_with = "de::number")]
    pub percentage: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub visible_fraction: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub phase_angle: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonEvents {
    #[serde(deserialize_with = "de::flag")]
    pub moonrise_visible: Option<bool>,
    #[serde(deserialize_with = "de::flag")]
    pub moonset_visible: Option<bool>,
    #[serde(deserialize_with = "de::lenient")]
    pub optimal_viewing_period: Option<ViewingPeriod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewingPeriod {
    #[serde(deserialize_with = "de::text")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub end_time: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub duration_hours: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub viewing_quality: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub recommendations: Option<Vec<String>>,
}

/// Location echo returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLocation {
    #[serde(deserialize_with = "de::text")]
    pub latitude: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub longitude: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub precision: Option<f64>,
    #[serde(deserialize_with = "de::flag")]
    pub using_default_location: Option<bool>,
    #[serde(deserialize_with = "de::text")]
    pub note: Option<String>,
}
