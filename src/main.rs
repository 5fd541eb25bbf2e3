//! # ptrack - Product Status Tracker
//!
//! Pulls open tasks from a set of planner boards and shows, per product, where
//! work is still open: which buckets, which statuses and which teams.
//!
//! ## Quick Start
//!
//! ```bash
//! # Pull every configured plan into ~/.ptrack/snapshot.json
//! ptrack fetch
//!
//! # One row per product, filtered to a bucket
//! ptrack view --bucket Design
//!
//! # One row per open task for two teams
//! ptrack view --strategy flat --team Alpha --team Beta
//!
//! # Interactive dashboard
//! ptrack ui
//! ```
//!
//! ## Configuration
//!
//! `~/.ptrack/config.toml`:
//!
//! ```toml
//! tenant_id = "..."
//! client_id = "..."
//! plan_ids = ["plan-a", "plan-b"]
//! strategy = "grouped"
//! ```
//!
//! The client secret is best supplied via `PTRACK_CLIENT_SECRET`. Logging is
//! opt-in through `RUST_LOG` and goes to stderr.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod aggregate;
pub mod auth;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod filter;
pub mod snapshot;
pub mod summary;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Overrides;

fn main() {
    // Tracing is opt-in via RUST_LOG and never writes to stdout.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let overrides = Overrides {
        tenant_id: cli.tenant_id,
        client_id: cli.client_id,
        client_secret: cli.client_secret,
    };
    let dir = default_dir();
    let ctx = match build_context(&dir, cli.config, cli.snapshot, overrides, cli.token) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let result = match cli.command {
        Commands::Fetch { output } => cmd_fetch(&ctx, output),
        Commands::View { strategy, filters, refresh, links, json } =>
            cmd_view(&ctx, strategy, filters, refresh, links, json),
        Commands::Options { strategy, json } => cmd_options(&ctx, strategy, json),
        Commands::Export { output, strategy, filters } => cmd_export(&ctx, output, strategy, filters),
        Commands::Ui { strategy } => cmd_ui(&ctx, strategy),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
