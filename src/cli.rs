use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Open planner work per product, bucket and team.
/// Data is cached in ~/.ptrack/snapshot.json unless --snapshot is given.
#[derive(Parser)]
#[command(name = "ptrack", version, about = "Product status tracker for planner boards")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, env = "PTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the cached snapshot file.
    #[arg(long, global = true, env = "PTRACK_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Directory tenant ID (overrides config).
    #[arg(long, global = true, env = "PTRACK_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Application client ID (overrides config).
    #[arg(long, global = true, env = "PTRACK_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Application client secret (overrides config).
    #[arg(long, global = true, env = "PTRACK_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Pre-issued bearer token; skips the client-credentials exchange.
    #[arg(long, global = true, env = "PTRACK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
