//! Display values derived from moon data
//!
//! Pure functions only: phase image selection, apparent size, disc rotation
//! and the SVG mask covering the unlit part of the disc. Every input coming
//! from the API is optional, so the bundled [`MoonView`] is too.

use crate::constants::lunar::{APOGEE_KM, PERIGEE_KM, SIZE_VARIATION};
use crate::moon::MoonData;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Base display size of the moon disc, pixels
pub const DEFAULT_BASE_SIZE: f64 = 64.0;

/// Side of the square the mask path is drawn in
const MASK_BOX: f64 = 100.0;

/// The eight named phases, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseImage {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl PhaseImage {
    /// Bucket a phase fraction
    ///
    /// Buckets are 0.125 wide and centred on each named phase, upper bounds
    /// inclusive. The phase wraps, so 1.0 is a new moon again.
    pub fn from_phase(phase: f64) -> Self {
        if !phase.is_finite() {
            return Self::Full;
        }

        let phase = phase.rem_euclid(1.0);
        match phase {
            p if p <= 0.0625 => Self::New,
            p if p <= 0.1875 => Self::WaxingCrescent,
            p if p <= 0.3125 => Self::FirstQuarter,
            p if p <= 0.4375 => Self::WaxingGibbous,
            p if p <= 0.5625 => Self::Full,
            p if p <= 0.6875 => Self::WaningGibbous,
            p if p <= 0.8125 => Self::LastQuarter,
            p if p <= 0.9375 => Self::WaningCrescent,
            _ => Self::New,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::WaxingCrescent => "waxing-crescent",
            Self::FirstQuarter => "first-quarter",
            Self::WaxingGibbous => "waxing-gibbous",
            Self::Full => "full",
            Self::WaningGibbous => "waning-gibbous",
            Self::LastQuarter => "last-quarter",
            Self::WaningCrescent => "waning-crescent",
        }
    }

    /// Path of the phase artwork served by the front end
    pub fn image_path(&self) -> String {
        format!("/images/moon-phase-images/{}-moon.png", self.slug())
    }
}

impl std::fmt::Display for PhaseImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Waxing or waning half of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Waxing,
    Waning,
}

impl Stage {
    /// Parse the API's stage string, falling back to the phase
    pub fn parse(stage: Option<&str>, phase: f64) -> Self {
        match stage.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("waxing") => Self::Waxing,
            Some("waning") => Self::Waning,
            _ => Self::from_phase(phase),
        }
    }

    pub fn from_phase(phase: f64) -> Self {
        if phase.rem_euclid(1.0) < 0.5 {
            Self::Waxing
        } else {
            Self::Waning
        }
    }
}

/// Parse "45%" (or "45") into 45.0
pub fn parse_illumination(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Apparent disc size for an earth-moon distance
///
/// Full base size at perigee, shrinking linearly by 20% towards apogee.
/// Distances outside that range extrapolate.
pub fn apparent_size(distance_km: f64, base_size: f64) -> f64 {
    let normalized = (distance_km - PERIGEE_KM) / (APOGEE_KM - PERIGEE_KM);
    (base_size * (1.0 - normalized * SIZE_VARIATION)).round()
}

/// Apparent rotation of the disc, degrees
pub fn moon_rotation(altitude: f64, azimuth: f64, parallactic_angle: f64) -> f64 {
    parallactic_angle + if azimuth > 180.0 { -altitude } else { altitude }
}

/// SVG path covering the unlit part of a 100x100 disc
///
/// `illumination` is the lit percentage when known; otherwise it is derived
/// from the phase. The dark half is on the left while waxing, on the right
/// while waning.
pub fn terminator_mask(phase: f64, illumination: Option<f64>, stage: Stage) -> String {
    let radius = MASK_BOX / 2.0;
    let center = MASK_BOX / 2.0;

    let lit = illumination
        .map(|pct| pct / 100.0)
        .unwrap_or_else(|| (1.0 - (2.0 * PI * phase).cos()) / 2.0)
        .clamp(0.0, 1.0);

    // Half-width of the terminator ellipse
    let rx = radius * (1.0 - 2.0 * lit).abs();
    let gibbous = lit > 0.5;

    let (edge_sweep, terminator_sweep) = match stage {
        Stage::Waxing => (0, u8::from(gibbous)),
        Stage::Waning => (1, u8::from(!gibbous)),
    };

    format!(
        "M{c},0 A{r},{r} 0 0,{e} {c},{d} A{rx},{r} 0 0,{t} {c},0",
        c = fmt_num(center),
        r = fmt_num(radius),
        d = fmt_num(MASK_BOX),
        e = edge_sweep,
        rx = fmt_num(rx),
        t = terminator_sweep,
    )
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Everything the front end derives from one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoonView {
    pub phase_image: Option<PhaseImage>,
    pub image_path: Option<String>,
    pub illumination: Option<f64>,
    pub stage: Option<Stage>,
    pub apparent_size: Option<f64>,
    pub rotation: Option<f64>,
    pub mask_path: Option<String>,
}

impl MoonView {
    pub fn from_moon_data(data: &MoonData) -> Self {
        let moon = data.moon.as_ref();
        let phase = moon.and_then(|m| m.phase);
        let illumination = moon
            .and_then(|m| m.illumination.as_deref())
            .and_then(parse_illumination);
        let stage = phase.map(|p| Stage::parse(moon.and_then(|m| m.stage.as_deref()), p));
        let position = moon
            .and_then(|m| m.detailed.as_ref())
            .and_then(|d| d.position.as_ref());

        let phase_image = phase.map(PhaseImage::from_phase);

        Self {
            image_path: phase_image.map(|p| p.image_path()),
            phase_image,
            illumination,
            stage,
            apparent_size: position
                .and_then(|p| p.distance)
                .map(|d| apparent_size(d, DEFAULT_BASE_SIZE)),
            rotation: position.and_then(|p| {
                Some(moon_rotation(p.altitude?, p.azimuth?, p.parallactic_angle?))
            }),
            mask_path: phase
                .zip(stage)
                .map(|(p, s)| terminator_mask(p, illumination, s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_phase_buckets() {
        assert_eq!(PhaseImage::from_phase(0.0), PhaseImage::New);
        assert_eq!(PhaseImage::from_phase(0.05), PhaseImage::New);
        assert_eq!(PhaseImage::from_phase(0.0625), PhaseImage::New);
        assert_eq!(PhaseImage::from_phase(0.0626), PhaseImage::WaxingCrescent);
        assert_eq!(PhaseImage::from_phase(0.25), PhaseImage::FirstQuarter);
        assert_eq!(PhaseImage::from_phase(0.4), PhaseImage::WaxingGibbous);
        assert_eq!(PhaseImage::from_phase(0.5), PhaseImage::Full);
        assert_eq!(PhaseImage::from_phase(0.5625), PhaseImage::Full);
        assert_eq!(PhaseImage::from_phase(0.6), PhaseImage::WaningGibbous);
        assert_eq!(PhaseImage::from_phase(0.75), PhaseImage::LastQuarter);
        assert_eq!(PhaseImage::from_phase(0.9375), PhaseImage::WaningCrescent);
        assert_eq!(PhaseImage::from_phase(0.96), PhaseImage::New);
    }

    #[test]
    fn test_phase_wraps() {
        assert_eq!(PhaseImage::from_phase(1.0), PhaseImage::New);
        assert_eq!(PhaseImage::from_phase(1.5), PhaseImage::Full);
        assert_eq!(PhaseImage::from_phase(-0.25), PhaseImage::LastQuarter);
        assert_eq!(PhaseImage::from_phase(f64::NAN), PhaseImage::Full);
    }

    #[test]
    fn test_image_names() {
        assert_eq!(PhaseImage::Full.slug(), "full");
        assert_eq!(
            PhaseImage::WaxingCrescent.image_path(),
            "/images/moon-phase-images/waxing-crescent-moon.png"
        );
        assert_eq!(
            serde_json::to_string(&PhaseImage::LastQuarter).unwrap(),
            "\"last-quarter\""
        );
    }

    #[test]
    fn test_apparent_size() {
        assert_relative_eq!(apparent_size(PERIGEE_KM, 64.0), 64.0);
        assert_relative_eq!(apparent_size(APOGEE_KM, 64.0), 51.0);
        assert_relative_eq!(apparent_size(384_400.0, 64.0), 58.0);
        // Extrapolates past perigee
        assert!(apparent_size(350_000.0, 64.0) > 64.0);
    }

    #[test]
    fn test_rotation() {
        assert_relative_eq!(moon_rotation(30.0, 90.0, 10.0), 40.0);
        assert_relative_eq!(moon_rotation(30.0, 270.0, 10.0), -20.0);
    }

    #[test]
    fn test_parse_illumination() {
        assert_eq!(parse_illumination("45%"), Some(45.0));
        assert_eq!(parse_illumination(" 7.5 % "), Some(7.5));
        assert_eq!(parse_illumination("100"), Some(100.0));
        assert_eq!(parse_illumination("bright"), None);
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(Stage::parse(Some("Waning"), 0.1), Stage::Waning);
        assert_eq!(Stage::parse(Some("waxing"), 0.9), Stage::Waxing);
        assert_eq!(Stage::parse(None, 0.3), Stage::Waxing);
        assert_eq!(Stage::parse(Some("?"), 0.7), Stage::Waning);
    }

    #[test]
    fn test_mask_half_moon_is_straight() {
        let path = terminator_mask(0.25, Some(50.0), Stage::Waxing);
        assert_eq!(path, "M50,0 A50,50 0 0,0 50,100 A0,50 0 0,0 50,0");
    }

    #[test]
    fn test_mask_sides_and_sweeps() {
        // Waxing crescent: dark on the left, terminator bulges right
        assert_eq!(
            terminator_mask(0.1, Some(10.0), Stage::Waxing),
            "M50,0 A50,50 0 0,0 50,100 A40,50 0 0,0 50,0"
        );
        // Waxing gibbous flips the terminator sweep
        assert_eq!(
            terminator_mask(0.4, Some(90.0), Stage::Waxing),
            "M50,0 A50,50 0 0,0 50,100 A40,50 0 0,1 50,0"
        );
        // Waning: dark on the right
        assert_eq!(
            terminator_mask(0.6, Some(90.0), Stage::Waning),
            "M50,0 A50,50 0 0,1 50,100 A40,50 0 0,0 50,0"
        );
        assert_eq!(
            terminator_mask(0.9, Some(10.0), Stage::Waning),
            "M50,0 A50,50 0 0,1 50,100 A40,50 0 0,1 50,0"
        );
    }

    #[test]
    fn test_mask_without_illumination_uses_phase() {
        // New moon: fully dark, terminator on the far edge
        assert_eq!(
            terminator_mask(0.0, None, Stage::Waxing),
            "M50,0 A50,50 0 0,0 50,100 A50,50 0 0,0 50,0"
        );
    }

    #[test]
    fn test_view_tolerates_missing_fields() {
        let view = MoonView::from_moon_data(&MoonData::default());
        assert_eq!(view, MoonView::default());
    }

    #[test]
    fn test_view_from_payload() {
        let data: MoonData = serde_json::from_str(
            r#"{"moon": {"phase": 0.93, "stage": "waning", "illumination": "7%",
                "detailed": {"position": {"altitude": 12.5, "azimuth": 95.0, "distance": 405696}}}}"#,
        )
        .unwrap();

        let view = MoonView::from_moon_data(&data);
        assert_eq!(view.phase_image, Some(PhaseImage::WaningCrescent));
        assert_eq!(view.stage, Some(Stage::Waning));
        assert_eq!(view.illumination, Some(7.0));
        assert_eq!(view.apparent_size, Some(51.0));
        // No parallactic angle reported
        assert_eq!(view.rotation, None);
        assert!(view.mask_path.unwrap().starts_with("M50,0 A50,50 0 0,1"));
    }
}
