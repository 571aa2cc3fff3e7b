#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the SAGIP hazard data server.
//!
//! Reads `BIND_ADDR`, `PORT`, and `SAGIP_CATALOG` from the environment.

use sagip_catalog::HazardCatalog;
use sagip_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let catalog = HazardCatalog::load(None).map_err(std::io::Error::other)?;

    run_server(catalog, ServerConfig::from_env()).await
}
