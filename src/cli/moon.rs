//! Moon command handler
//!
//! Resolves a location, fetches its moon data and prints the snapshot.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::Coordinates;
use crate::store::{LiveStore, LocationState};
use clap::Args;

/// Moon command arguments
#[derive(Args)]
pub struct MoonArgs {
    /// City name (geocoded)
    #[arg(long, short = 'c', conflicts_with_all = ["lat", "lon", "here"])]
    pub city: Option<String>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lon", "city"])]
    pub here: bool,

    /// Latitude
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Output format (text, json)
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the moon command
pub async fn run(args: MoonArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;
    config.warn_missing_keys();

    // Resolve the formatter before spending any API calls
    let format = args.format.as_deref().unwrap_or("text");
    let formatter =
        get_formatter(format).ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let mut store = LiveStore::from_config(&config);

    if let Some(city) = &args.city {
        store.update_location(city).await?;
        eprintln!("Geocoded to: {}", store.snapshot().await.city_name);
    } else if args.here {
        let coords = store.request_browser_location().await?;
        eprintln!("Using current location: ({:.4}, {:.4})", coords.lat, coords.lon);
    } else {
        if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
            let coords = Coordinates::new(lat, lon);
            coords.validate()?;
            let label = format!("{:.4}, {:.4}", lat, lon);
            store = store.with_state(LocationState::new(coords, label));
        }
        store.refresh_moon_data().await?;
    }

    let output = formatter.format(&store.snapshot().await)?;

    // Write output
    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:<6} - {}", format.name, format.description);
    }
}
