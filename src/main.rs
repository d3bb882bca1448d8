//! Graphite Router CLI
//!
//! Command-line access to the finder and render paths:
//! - Resolve path queries (`find`, `series`)
//! - Fetch and decode points (`render`)
//! - Generate a default config file (`config`)

use anyhow::Context;
use bytes::Bytes;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphite_router::config::{generate_default_config, Config, LoggingConfig};
use graphite_router::{new_finder, ClickHouseClient, Data, Finder, PointsQuery, TreeFinder};

#[derive(Parser)]
#[command(name = "graphite-router")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Graphite query routing and points decoding for ClickHouse")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List metric names and branches matching a path query
    Find {
        /// Graphite path query, globs allowed
        query: String,
        /// Range start: "now", unix seconds, or relative like -1h, -7d
        #[arg(long, default_value = "-1d", allow_hyphen_values = true)]
        from: String,
        /// Range end
        #[arg(long, default_value = "now", allow_hyphen_values = true)]
        until: String,
    },

    /// List leaf metric names matching a path query
    Series {
        query: String,
        #[arg(long, default_value = "-1d", allow_hyphen_values = true)]
        from: String,
        #[arg(long, default_value = "now", allow_hyphen_values = true)]
        until: String,
    },

    /// Fetch points for every series matching a path query
    Render {
        target: String,
        #[arg(long, default_value = "-1d", allow_hyphen_values = true)]
        from: String,
        #[arg(long, default_value = "now", allow_hyphen_values = true)]
        until: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let now = Utc::now().timestamp();

    match cli.command {
        Commands::Find { query, from, until } => {
            let config = setup(cli.config.as_deref())?;
            let finder = new_finder(&config.clickhouse)?;
            let result = finder
                .execute(&query, parse_time(&from, now)?, parse_time(&until, now)?)
                .await?;
            print_names(result.list(), &cli.format)?;
        }
        Commands::Series { query, from, until } => {
            let config = setup(cli.config.as_deref())?;
            let finder = new_finder(&config.clickhouse)?;
            let result = finder
                .execute(&query, parse_time(&from, now)?, parse_time(&until, now)?)
                .await?;
            print_names(result.series(), &cli.format)?;
        }
        Commands::Render {
            target,
            from,
            until,
        } => {
            let config = setup(cli.config.as_deref())?;
            let from = parse_time(&from, now)?;
            let until = parse_time(&until, now)?;
            let data = render(&config, &target, from, until).await?;
            print_points(&data, &cli.format)?;
        }
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing config to {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Load configuration and initialize logging
fn setup(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_tracing(&config.logging)?;

    tracing::debug!("Graphite Router v{}", env!("CARGO_PKG_VERSION"));
    Ok(config)
}

/// Resolve `target`, then fetch its points from the matching data table
async fn render(config: &Config, target: &str, from: i64, until: i64) -> anyhow::Result<Data> {
    let ch = &config.clickhouse;
    let execution = TreeFinder::from_config(ch)?
        .route(target, from, until)
        .await?;
    let reversed = execution.is_reversed();

    let names: Vec<String> = execution
        .series()
        .iter()
        .map(|n| String::from_utf8_lossy(n).into_owned())
        .collect();

    let query = match (&ch.reverse_data_table, reversed) {
        (Some(table), true) if !table.is_empty() => PointsQuery::reversed(table.clone()),
        _ => PointsQuery::new(ch.data_table.clone()),
    };

    let client = ClickHouseClient::new(
        &ch.url,
        std::time::Duration::from_millis(ch.data_timeout_ms),
    )?;
    let mut data = query
        .fetch(&client, &names, from, until, &[])
        .await
        .with_context(|| format!("fetching points for {}", target))?;
    data.sort();

    tracing::info!(
        query = %target,
        series = names.len(),
        points = data.len(),
        reversed,
        "Rendered target"
    );

    Ok(data)
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("graphite_router={}", logging.level)),
    );

    let file = match &logging.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?,
        ),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match (logging.format.as_str(), file) {
        ("json", Some(file)) => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .init(),
        ("json", None) => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (_, Some(file)) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init(),
        (_, None) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

/// Parse "now", unix seconds, or a relative offset like "-15min", "-1h", "-7d"
fn parse_time(s: &str, now: i64) -> anyhow::Result<i64> {
    let s = s.trim().to_lowercase();

    if s == "now" {
        return Ok(now);
    }
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }

    let offset = s
        .strip_prefix('-')
        .ok_or_else(|| anyhow::anyhow!("Invalid time: {}. Use: now, unix seconds, -1h, -7d", s))?;

    let split = offset
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(offset.len());
    let (amount, unit) = offset.split_at(split);
    let amount: i64 = amount
        .parse()
        .with_context(|| format!("Invalid time offset: {}", s))?;

    let duration = match unit {
        "s" => Duration::try_seconds(amount),
        "min" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => anyhow::bail!("Invalid time unit in {}. Use: s, min, h, d, w", s),
    }
    .ok_or_else(|| anyhow::anyhow!("Time offset out of range: {}", s))?;

    now.checked_sub(duration.num_seconds())
        .ok_or_else(|| anyhow::anyhow!("Time offset out of range: {}", s))
}

fn print_names(names: &[Bytes], format: &str) -> anyhow::Result<()> {
    let names: Vec<String> = names
        .iter()
        .map(|n| String::from_utf8_lossy(n).into_owned())
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn print_points(data: &Data, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&data.points)?);
        return Ok(());
    }

    let mut current = 0;
    for point in &data.points {
        if point.metric_id != current {
            current = point.metric_id;
            println!("{}", point.metric);
        }
        println!("  {:>12}  {}", point.time, point.value);
    }
    Ok(())
}
