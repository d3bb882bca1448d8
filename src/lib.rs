//! # Graphite Router
//!
//! Query routing and response decoding for a Graphite-compatible front end
//! backed by ClickHouse.
//!
//! ## Features
//!
//! - **Reverse routing**: queries ending in a literal segment are answered
//!   from a reverse tree table, transparently re-reversed
//! - **RowBinary decoding**: points responses decoded in two passes with
//!   per-response series ID interning
//! - **Sortable results**: points ordered by series, then time
//!
//! ## Modules
//!
//! - [`finder`]: Metric path finders and reverse routing
//! - [`render`]: Points query and RowBinary decoding
//! - [`clickhouse`]: HTTP transport
//! - [`config`]: TOML configuration with env overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphite_router::finder::{BaseFinder, ReverseFinder};
//! use graphite_router::render::PointsQuery;
//! use graphite_router::clickhouse::ClickHouseClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = "http://localhost:8123/";
//!     let timeout = Duration::from_secs(60);
//!
//!     let forward = BaseFinder::new(url, "graphite_tree", timeout)?;
//!     let finder = ReverseFinder::wrap(forward, url, "graphite_reverse_tree", timeout)?;
//!
//!     // Literal last segment: answered by the reverse tree
//!     let execution = finder.route("*.host1.cpu", 0, 3600).await?;
//!     let names: Vec<String> = execution
//!         .series()
//!         .iter()
//!         .map(|n| String::from_utf8_lossy(n).into_owned())
//!         .collect();
//!
//!     let client = ClickHouseClient::new(url, timeout)?;
//!     let mut data = PointsQuery::new("graphite")
//!         .fetch(&client, &names, 0, 3600, &[])
//!         .await?;
//!     data.sort();
//!
//!     println!("Found {} points", data.len());
//!     Ok(())
//! }
//! ```

pub mod clickhouse;
pub mod config;
pub mod finder;
pub mod render;

// Re-export top-level types for convenience
pub use clickhouse::{ClickHouseClient, ClickHouseError};

pub use config::{ClickHouseConfig, Config, ConfigError, LoggingConfig};

pub use finder::{
    classify, new_finder, reverse_bytes, reverse_string, BaseFinder, Classification, FindResult,
    Finder, FinderError, FinderResult, ReverseExecution, ReverseFinder, TreeFinder,
};

pub use render::{
    data_count, read_uvarint, Data, DecodeError, Point, PointsQuery, RenderError,
};
