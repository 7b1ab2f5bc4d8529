//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "location.city")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    // Env overrides must not end up in the file
    let mut config = Config::load_file()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display a key, masked when set
fn masked(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{} = \"\" # not configured", name)
    } else {
        format!("{} = \"***\" # configured", name)
    }
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    println!("[location]");
    println!("lat = {}", config.location.lat);
    println!("lon = {}", config.location.lon);
    println!("city = \"{}\"", config.location.city);
    println!("geolocation = {}", config.location.geolocation);
    println!("ip_api_url = \"{}\"", config.location.ip_api_url);
    println!();

    println!("[moon]");
    println!("base_url = \"{}\"", config.moon.base_url);
    println!("host = \"{}\"", config.moon.host);
    println!("throttle_backoff_ms = {}", config.moon.throttle_backoff_ms);
    println!("clear_stale_on_refresh = {}", config.moon.clear_stale_on_refresh);
    println!();

    println!("[geocode]");
    println!("base_url = \"{}\"", config.geocode.base_url);
    println!();

    println!("[api_keys]");
    println!("{}", masked("moon", &config.api_keys.moon));
    println!("{}", masked("geocode", &config.api_keys.geocode));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked() {
        assert_eq!(masked("moon", ""), "moon = \"\" # not configured");
        assert_eq!(masked("moon", "secret"), "moon = \"***\" # configured");
    }
}
