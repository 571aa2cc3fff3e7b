#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the SAGIP hazard map.
//!
//! ```text
//! sagip serve [--bind 0.0.0.0] [--port 8000] [--catalog path.toml]
//! sagip map   [--api-url http://localhost:8000/api] [--layer all|FLOOD|...] [--width 800 --height 500]
//! sagip stats [--catalog path.toml]
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sagip_catalog::{CATALOG_ENV_VAR, HazardCatalog};
use sagip_client::session::DEFAULT_SYNC_PERIOD;
use sagip_client::{API_URL_ENV_VAR, CatalogFeed, DEFAULT_API_URL, HazardFeed, HttpFeed, MapSession};
use sagip_hazard_models::{HazardSeverity, HazardType, LayerFilter};
use sagip_map::MapConfig;
use sagip_server::{DEFAULT_BIND_ADDR, DEFAULT_PORT, ServerConfig};

#[derive(Parser)]
#[command(name = "sagip", about = "Hazard data service and map renderer for Batong Malake")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the hazard data API server
    Serve {
        /// Interface to bind
        #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
        bind: String,
        /// TCP port
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Hazard catalog TOML (defaults to the built-in catalog)
        #[arg(long, env = CATALOG_ENV_VAR)]
        catalog: Option<PathBuf>,
    },
    /// Render the hazard map and print it as JSON
    Map {
        /// Base URL of the hazard data API
        #[arg(long, env = API_URL_ENV_VAR, default_value = DEFAULT_API_URL)]
        api_url: String,
        /// Render from a local catalog file instead of the API
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Visible layer: `all` or a hazard type such as `FLOOD`
        #[arg(long, default_value = "all")]
        layer: LayerFilter,
        /// Map width in pixels
        #[arg(long, default_value_t = 800)]
        width: u32,
        /// Map height in pixels
        #[arg(long, default_value_t = 500)]
        height: u32,
    },
    /// Print hazard counts by type and severity
    Stats {
        /// Hazard catalog TOML (defaults to the built-in catalog)
        #[arg(long, env = CATALOG_ENV_VAR)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            port,
            catalog,
        } => {
            let catalog = HazardCatalog::load(catalog.as_deref())?;
            let config = ServerConfig {
                bind_addr: bind,
                port,
            };
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(sagip_server::run_server(catalog, config))
            })
            .await??;
        }
        Commands::Map {
            api_url,
            catalog,
            layer,
            width,
            height,
        } => {
            let feed: Box<dyn HazardFeed> = match catalog {
                Some(path) => Box::new(CatalogFeed::new(HazardCatalog::from_path(&path)?)),
                None => Box::new(HttpFeed::new(&api_url)?),
            };
            let config = MapConfig {
                width_px: width,
                height_px: height,
                ..MapConfig::default()
            };

            let mut session = MapSession::mount(&*feed, config, DEFAULT_SYNC_PERIOD).await;
            session.select_layer(layer);
            println!("{}", serde_json::to_string_pretty(&session.report())?);
            session.unmount().await;
        }
        Commands::Stats { catalog } => {
            let catalog = HazardCatalog::load(catalog.as_deref())?;
            print_stats(&catalog);
        }
    }

    Ok(())
}

fn print_stats(catalog: &HazardCatalog) {
    let stats = catalog.compute_hazard_stats();

    println!("{:<14} COUNT", "TYPE");
    println!("{}", "-".repeat(20));
    for &hazard_type in HazardType::all() {
        println!(
            "{:<14} {}",
            hazard_type.as_ref(),
            stats.by_type.get(hazard_type)
        );
    }

    println!();
    println!("{:<14} COUNT", "SEVERITY");
    println!("{}", "-".repeat(20));
    for &severity in HazardSeverity::all() {
        println!(
            "{:<14} {}",
            format!("{severity} ({})", severity.tier()),
            stats.by_severity.get(severity)
        );
    }

    println!("\n{} hazard(s)", stats.total);
}
