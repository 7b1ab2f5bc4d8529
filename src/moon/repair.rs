//! Recovery of moon-phase API bodies
//!
//! The upstream sometimes appends trailing bytes after the JSON object, and
//! has moved the phase events between two locations across versions. A body
//! goes through truncation, parsing, shape normalization, validation and
//! finally typed decoding.

use crate::error::{Error, Result};
use crate::moon::MoonData;
use serde_json::{Map, Value};

const CANONICAL_FULL_MOON_NEXT: &str = "/moon_phases/full_moon/next";
const LEGACY_PHASES: &str = "/moon/detailed/upcoming_phases";

/// Cut the body right after the last `}}`
pub fn truncate_payload(raw: &str) -> Result<&str> {
    raw.rfind("}}")
        .map(|idx| &raw[..idx + 2])
        .ok_or_else(|| Error::Parse("no valid JSON structure found".to_string()))
}

/// Truncate and parse a raw body into untyped JSON
pub fn parse_payload(raw: &str) -> Result<Value> {
    let cleaned = truncate_payload(raw)?;
    serde_json::from_str(cleaned)
        .map_err(|e| Error::Parse(format!("Failed to parse API response: {}", e)))
}

/// The pointer leads to a JSON object
fn resolves(value: &Value, pointer: &str) -> bool {
    value.pointer(pointer).is_some_and(Value::is_object)
}

/// Lift the legacy phase events to `moon_phases`
///
/// Copies the whole `moon.detailed.upcoming_phases` object when
/// `moon_phases` is missing, or just its `full_moon.next` when the
/// canonical object exists without one. Never overwrites canonical data.
pub fn normalize_phases(value: &mut Value) {
    let Some(legacy) = value.pointer(LEGACY_PHASES).filter(|v| !v.is_null()).cloned() else {
        return;
    };
    let Some(root) = value.as_object_mut() else {
        return;
    };

    if matches!(root.get("moon_phases"), None | Some(Value::Null)) {
        root.insert("moon_phases".to_string(), legacy);
        return;
    }

    let Some(phases) = root.get_mut("moon_phases") else {
        return;
    };
    if resolves(phases, "/full_moon/next") {
        return;
    }
    let Some(next) = legacy.pointer("/full_moon/next").filter(|v| v.is_object()) else {
        return;
    };
    let Some(phases) = phases.as_object_mut() else {
        return;
    };

    let full_moon = phases
        .entry("full_moon")
        .or_insert_with(|| Value::Object(Map::new()));
    if !full_moon.is_object() {
        *full_moon = Value::Object(Map::new());
    }
    if let Some(full_moon) = full_moon.as_object_mut() {
        full_moon.insert("next".to_string(), next.clone());
    }
}

/// Require the canonical next-full-moon event
pub fn validate(value: &Value) -> Result<()> {
    if resolves(value, CANONICAL_FULL_MOON_NEXT) {
        Ok(())
    } else {
        Err(Error::Validation(
            "Invalid data structure received from API".to_string(),
        ))
    }
}

/// Full pipeline from raw body to a validated record
///
/// Leaves of the wrong type decode as absent; only the canonical
/// next-full-moon event is required.
pub fn decode(raw: &str) -> Result<MoonData> {
    let mut value = parse_payload(raw)?;
    normalize_phases(&mut value);
    validate(&value)?;

    serde_json::from_value(value)
        .map_err(|e| Error::Parse(format!("Unexpected value in API response: {}", e)))
}
