//! nc-proxy
//!
//! A credentialed forwarding gateway for the Namecheap XML API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                      NC PROXY                        │
//!                     │                                                      │
//!   Client Request    │  ┌───────────┐   ┌──────────┐   ┌────────────────┐  │
//!   ──────────────────┼─▶│ admission │──▶│   auth   │──▶│   translator   │  │
//!                     │  │ semaphore │   │  (Basic) │   │ (query / body) │  │
//!                     │  └───────────┘   └──────────┘   └───────┬────────┘  │
//!                     │                                         │           │
//!                     │                                         ▼           │
//!   Client Response   │  ┌───────────┐                  ┌────────────────┐  │
//!   ◀─────────────────┼──│   relay   │◀─────────────────│   dispatcher   │◀─┼─── Upstream
//!                     │  │ + headers │                  │ timeout, retry │  │    XML API
//!                     │  └───────────┘                  └────────────────┘  │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use nc_proxy::config::loader;
use nc_proxy::lifecycle::startup;

/// Credentialed forwarding gateway for the Namecheap XML API.
///
/// Settings come from built-in defaults, then the optional TOML file, then
/// environment variables (PORT, PROXY_USER, PROXY_PASS, UPSTREAM_URL, ...).
#[derive(Parser)]
#[command(name = "nc-proxy", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit without serving.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match loader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("nc-proxy: {}", e);
            std::process::exit(2);
        }
    };

    if cli.check {
        println!("configuration ok");
        return Ok(());
    }

    startup::run(config).await
}
