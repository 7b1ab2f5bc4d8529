//! lunatrack CLI entry point
//!
//! Moon phase lookups - CLI + web app

use lunatrack::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
