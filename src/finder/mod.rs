//! Metric path finders
//!
//! A finder resolves a Graphite path query (possibly with globs) into
//! the metric names that exist in the store.
//!
//! - **BaseFinder**: queries one tree table
//! - **ReverseFinder**: routes literal-suffix queries to a reverse tree
//!   table and turns the results back into forward orientation
//!
//! # Routing
//!
//! ```text
//! "a.b.*"  → forward tree   "a.b.*"
//! "a.*.c"  → reverse tree   "c.*.a"  → results re-reversed
//! ```

mod base;
mod error;
pub mod glob;
mod reverse;

pub use base::BaseFinder;
pub use error::{FinderError, FinderResult};
pub use reverse::{
    classify, reverse_bytes, reverse_string, Classification, ReverseExecution, ReverseFinder,
};

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::config::ClickHouseConfig;

/// Names returned by one finder execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResult {
    list: Vec<Bytes>,
    series: Vec<Bytes>,
}

impl FindResult {
    /// Build from individual names. Names ending in `.` are branches
    /// and are left out of `series`.
    pub fn from_names(list: Vec<Bytes>) -> Self {
        let series = list
            .iter()
            .filter(|name| !name.ends_with(b"."))
            .cloned()
            .collect();
        Self { list, series }
    }

    /// Build from a newline separated response body, skipping empty rows
    pub fn from_body(body: Bytes) -> Self {
        let mut names = Vec::new();
        let mut start = 0;
        for (i, &b) in body.iter().enumerate() {
            if b == b'\n' {
                if i > start {
                    names.push(body.slice(start..i));
                }
                start = i + 1;
            }
        }
        if start < body.len() {
            names.push(body.slice(start..));
        }
        Self::from_names(names)
    }

    /// All matched names, branches included
    pub fn list(&self) -> &[Bytes] {
        &self.list
    }

    /// Matched leaf names only
    pub fn series(&self) -> &[Bytes] {
        &self.series
    }

    /// Apply `f` to every name
    pub fn map_names(self, f: impl Fn(&[u8]) -> Bytes) -> Self {
        Self {
            list: self.list.iter().map(|n| f(n)).collect(),
            series: self.series.iter().map(|n| f(n)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// A source of metric names for path queries
///
/// Each call to `execute` is independent: the returned `FindResult`
/// carries everything later listing needs, so one finder may serve
/// concurrent queries.
#[async_trait]
pub trait Finder: Send + Sync {
    /// Resolve `query` for the time range `[from, until]`
    async fn execute(&self, query: &str, from: i64, until: i64) -> FinderResult<FindResult>;

    /// Canonical absolute form of an already resolved name
    fn abs(&self, name: Bytes) -> Bytes {
        name
    }
}

#[async_trait]
impl<F: Finder + ?Sized> Finder for Box<F> {
    async fn execute(&self, query: &str, from: i64, until: i64) -> FinderResult<FindResult> {
        (**self).execute(query, from, until).await
    }

    fn abs(&self, name: Bytes) -> Bytes {
        (**self).abs(name)
    }
}

/// Tree finder assembled from configuration
#[derive(Debug, Clone)]
pub enum TreeFinder {
    /// No reverse tree configured
    Forward(BaseFinder),
    /// Literal-suffix queries go to the reverse tree
    Reverse(ReverseFinder<BaseFinder>),
}

impl TreeFinder {
    /// Build the finder stack described by `config`.
    ///
    /// With a reverse tree table configured, queries are routed through a
    /// `ReverseFinder`; otherwise the forward tree is used directly.
    pub fn from_config(config: &ClickHouseConfig) -> FinderResult<Self> {
        let timeout = Duration::from_millis(config.tree_timeout_ms);
        let forward = BaseFinder::new(&config.url, config.tree_table.clone(), timeout)?;

        match config.reverse_tree_table.as_deref() {
            Some(table) if !table.is_empty() => {
                tracing::debug!(table = %table, "Reverse tree routing enabled");
                Ok(Self::Reverse(ReverseFinder::wrap(
                    forward,
                    &config.url,
                    table,
                    timeout,
                )?))
            }
            _ => Ok(Self::Forward(forward)),
        }
    }

    /// Run `query`, keeping the routing decision next to the result
    pub async fn route(&self, query: &str, from: i64, until: i64) -> FinderResult<ReverseExecution> {
        match self {
            Self::Forward(finder) => Ok(ReverseExecution::forward(
                query,
                finder.execute(query, from, until).await?,
            )),
            Self::Reverse(finder) => finder.route(query, from, until).await,
        }
    }
}

#[async_trait]
impl Finder for TreeFinder {
    async fn execute(&self, query: &str, from: i64, until: i64) -> FinderResult<FindResult> {
        Ok(self.route(query, from, until).await?.into_result())
    }
}

/// Boxed form of `TreeFinder::from_config`
pub fn new_finder(config: &ClickHouseConfig) -> FinderResult<Box<dyn Finder>> {
    Ok(Box::new(TreeFinder::from_config(config)?))
}
