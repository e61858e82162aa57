// Configuration - command line flags with environment fallbacks

use clap::{Args, Parser};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "catalog.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Options every binary needs to reach the store and log
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// SQLite database file (created if missing)
    #[arg(long, env = "CATALOG_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Default log filter; RUST_LOG takes precedence when set
    #[arg(long, env = "CATALOG_LOG", default_value = "info")]
    pub log_level: String,
}

/// Cinema catalog HTTP server
#[derive(Parser, Debug, Clone)]
#[command(name = "cinema-server", version)]
#[command(about = "Serves the actor/movie catalog over HTTP", long_about = None)]
pub struct ServerConfig {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Address to listen on
    #[arg(long, env = "CATALOG_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,
}
