//! Command implementations for the CLI interface.
//!
//! This module contains the subcommands: fetching a snapshot, printing the
//! filtered view, listing filter values, CSV export and the dashboard TUI.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::{json, Value};

use crate::aggregate::{Table, SET_SEPARATOR};
use crate::auth::{ClientCredentials, StaticToken, TokenProvider};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{HttpTransport, PlanFetcher};
use crate::fields::Strategy;
use crate::filter::Filters;
use crate::snapshot::{format_fetched_at, truncate, Snapshot};
use crate::summary::Summary;
use crate::tui::run::run_dashboard;
use crate::view::{compute_view, View};

#[derive(Subcommand)]
pub enum Commands {
    /// Authenticate, fetch every configured plan and save a snapshot.
    Fetch {
        /// Write the snapshot here instead of the default location.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the filtered table with product count and team distribution.
    View {
        /// Output shape: flat | grouped. Defaults to the config value.
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Fetch a fresh snapshot before rendering.
        #[arg(long)]
        refresh: bool,
        /// Include task links.
        #[arg(long)]
        links: bool,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List the values offered by the product, bucket and team filters.
    Options {
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
        #[arg(long)]
        json: bool,
    },

    /// Export the filtered table to CSV.
    Export {
        /// Output file path (defaults to products.csv).
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Launch the interactive dashboard.
    Ui {
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Filter flags shared by `view` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Product title to show ("All" for every product).
    #[arg(long)]
    pub product: Option<String>,
    /// Bucket to include. May be repeated.
    #[arg(long = "bucket")]
    pub buckets: Vec<String>,
    /// Team (plan name) to include. May be repeated.
    #[arg(long = "team")]
    pub teams: Vec<String>,
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Filters {
            product: args.product,
            buckets: args.buckets,
            teams: args.teams,
        }
    }
}

/// Resolved settings shared by every command.
pub struct Context {
    pub config: Config,
    pub snapshot_path: PathBuf,
    pub token: Option<String>,
}

impl Context {
    fn strategy(&self, chosen: Option<Strategy>) -> Strategy {
        chosen.unwrap_or(self.config.strategy)
    }

    /// Authenticate and fetch every configured plan. Authentication failure aborts.
    pub fn fetch_snapshot(&self) -> Result<Snapshot> {
        let token = self.token.clone().filter(|t| !t.trim().is_empty());
        self.config.validate_for_fetch(token.is_some())?;

        let provider: Box<dyn TokenProvider> = match token {
            Some(t) => Box::new(StaticToken(t)),
            None => Box::new(ClientCredentials::from_config(&self.config)?),
        };
        let access_token = provider.access_token()?;

        let transport = HttpTransport::from_config(&self.config, access_token)?;
        let fetcher = PlanFetcher::new(transport, &self.config.tenant_id);
        Ok(fetcher.fetch_all(&self.config.plan_ids()))
    }

    /// Load the cached snapshot, fetching first when asked or when none exists.
    pub fn load_snapshot(&self, refresh: bool) -> Result<Snapshot> {
        if refresh || !self.snapshot_path.exists() {
            let snapshot = self.fetch_snapshot()?;
            snapshot.save(&self.snapshot_path)?;
            return Ok(snapshot);
        }
        Snapshot::load(&self.snapshot_path)
    }
}

/// Fetch all plans and save the snapshot.
pub fn cmd_fetch(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let snapshot = ctx.fetch_snapshot()?;
    let path = output.unwrap_or_else(|| ctx.snapshot_path.clone());
    snapshot.save(&path)?;
    println!(
        "Fetched {} of {} plan(s), {} task(s) -> {}",
        snapshot.plans.len(),
        ctx.config.plan_ids().len(),
        snapshot.task_count(),
        path.display()
    );
    Ok(())
}

/// Print the filtered view.
pub fn cmd_view(
    ctx: &Context,
    strategy: Option<Strategy>,
    filters: FilterArgs,
    refresh: bool,
    links: bool,
    json: bool,
) -> Result<()> {
    let snapshot = ctx.load_snapshot(refresh)?;
    let view = compute_view(&snapshot, ctx.strategy(strategy), &filters.into());

    if json {
        println!("{}", serde_json::to_string_pretty(&view_json(&view))?);
        return Ok(());
    }

    println!("Snapshot: {}", format_fetched_at(snapshot.fetched_at_utc));
    println!("Total Products: {}", view.summary.distinct_products);
    println!();
    match &view.table {
        Table::Flat(_) => print_flat_table(&view.table, links),
        Table::Grouped(_) => print_grouped_table(&view.table, links),
    }
    if view.summary.has_chart() {
        println!();
        print_team_distribution(&view.summary);
    }
    Ok(())
}

/// Print the three filter value sets.
pub fn cmd_options(ctx: &Context, strategy: Option<Strategy>, json: bool) -> Result<()> {
    let snapshot = ctx.load_snapshot(false)?;
    let view = compute_view(&snapshot, ctx.strategy(strategy), &Filters::default());
    let options = view.options;

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }
    print_option_list("Products", &options.products);
    print_option_list("Buckets", &options.buckets);
    print_option_list("Teams", &options.teams);
    Ok(())
}

fn print_option_list(name: &str, values: &[String]) {
    println!("{} ({})", name, values.len());
    for v in values {
        println!("  {}", v);
    }
}

/// Export the filtered table to CSV.
pub fn cmd_export(
    ctx: &Context,
    output: Option<String>,
    strategy: Option<Strategy>,
    filters: FilterArgs,
) -> Result<()> {
    let output_path = output.unwrap_or_else(|| "products.csv".to_string());
    let snapshot = ctx.load_snapshot(false)?;
    let view = compute_view(&snapshot, ctx.strategy(strategy), &filters.into());

    let csv_content = table_to_csv(&view.table);
    std::fs::write(&output_path, csv_content)?;
    println!("Exported {} row(s) to {}", view.table.len(), output_path);
    Ok(())
}

/// Launch the terminal dashboard.
pub fn cmd_ui(ctx: &Context, strategy: Option<Strategy>) -> Result<()> {
    let snapshot = ctx.load_snapshot(false)?;
    run_dashboard(ctx, snapshot, ctx.strategy(strategy))
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Default per-user directory for config and snapshot.
pub fn default_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".ptrack")
}

/// Build the shared context from global flags.
pub fn build_context(
    dir: &Path,
    config_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    overrides: crate::config::Overrides,
    token: Option<String>,
) -> Result<Context> {
    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::load_or_default(&dir.join("config.toml"))?,
    };
    Ok(Context {
        config: config.with_overrides(overrides),
        snapshot_path: snapshot_path.unwrap_or_else(|| dir.join("snapshot.json")),
        token,
    })
}

fn print_flat_table(table: &Table, links: bool) {
    let Table::Flat(rows) = table else { return };
    println!(
        "{:<28} {:<16} {:<16} {:<18} {:<10} {:<11}{}",
        "Product", "Bucket", "Status", "Team", "Created", "Due",
        if links { " Link" } else { "" }
    );
    for r in rows {
        println!(
            "{:<28} {:<16} {:<16} {:<18} {:<10} {:<11}{}",
            truncate(&r.product, 28),
            truncate(&r.bucket, 16),
            r.status.label(),
            truncate(&r.team, 18),
            r.created.as_deref().unwrap_or(""),
            r.due,
            if links { format!(" {}", r.link) } else { String::new() }
        );
    }
}

fn print_grouped_table(table: &Table, links: bool) {
    let Table::Grouped(rows) = table else { return };
    println!(
        "{:<28} {:<28} {:<34} {}",
        "Product Name", "Buckets", "Statuses", "Team"
    );
    for r in rows {
        println!(
            "{:<28} {:<28} {:<34} {}",
            truncate(&r.product, 28),
            truncate(&r.buckets_joined(), 28),
            r.statuses_joined(),
            r.teams_joined()
        );
        if links {
            println!("    {}", r.links_joined());
        }
    }
}

fn print_team_distribution(summary: &Summary) {
    println!("Product Distribution by Team");
    println!("{:<24} {:>5} {:>7}", "Team", "Count", "Share");
    for (team, count) in summary.ranked_teams() {
        let share = summary.share(count);
        let bar = "█".repeat((share / 5.0).round() as usize);
        println!("{:<24} {:>5} {:>6.1}% {}", truncate(team, 24), count, share, bar);
    }
}

fn view_json(view: &View) -> Value {
    let rows: Vec<Value> = match &view.table {
        Table::Flat(rows) => rows
            .iter()
            .map(|r| {
                json!({
                    "product": r.product,
                    "bucket": r.bucket,
                    "status": r.status.label(),
                    "team": r.team,
                    "created": r.created,
                    "due": r.due,
                    "link": r.link,
                })
            })
            .collect(),
        Table::Grouped(rows) => rows
            .iter()
            .map(|r| {
                json!({
                    "product": r.product,
                    "buckets": r.buckets_joined(),
                    "statuses": r.statuses_joined(),
                    "team": r.teams_joined(),
                    "links": r.links,
                })
            })
            .collect(),
    };
    json!({
        "strategy": view.table.strategy(),
        "rows": rows,
        "summary": view.summary,
        "options": view.options,
    })
}

/// Escape a CSV field if it contains separators, quotes or newlines.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn table_to_csv(table: &Table) -> String {
    let mut csv_content = String::new();
    match table {
        Table::Flat(rows) => {
            csv_content.push_str("Product,Bucket,Status,Team,Created,Due,Link\n");
            for r in rows {
                let fields = [
                    r.product.as_str(),
                    r.bucket.as_str(),
                    r.status.label(),
                    r.team.as_str(),
                    r.created.as_deref().unwrap_or(""),
                    r.due.as_str(),
                    r.link.as_str(),
                ];
                push_csv_line(&mut csv_content, &fields);
            }
        }
        Table::Grouped(rows) => {
            csv_content.push_str("Product Name,Buckets,Statuses,Team,Open Task Links\n");
            for r in rows {
                let buckets = r.buckets_joined();
                let statuses = r.statuses_joined();
                let teams = r.teams_joined();
                let links = r.links_joined();
                push_csv_line(
                    &mut csv_content,
                    &[r.product.as_str(), buckets.as_str(), statuses.as_str(), teams.as_str(), links.as_str()],
                );
            }
        }
    }
    csv_content
}

fn push_csv_line(out: &mut String, fields: &[&str]) {
    let line = fields.iter().map(|f| escape_csv(f)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Options rendered as comma-joined text, used by the dashboard header.
pub fn join_selection(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(SET_SEPARATOR)
    }
}
