//! Reverse tree routing
//!
//! Index scans only help when the query is anchored at its literal end.
//! A query such as `*.host1.cpu` has no literal prefix, but its reversal
//! `cpu.host1.*` does, so it is sent to a tree table that stores every
//! path with its segments reversed. Results are reversed back before
//! callers see them.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::finder::base::BaseFinder;
use crate::finder::error::FinderResult;
use crate::finder::glob::has_wildcard;
use crate::finder::{FindResult, Finder};

/// Reverse the segment order of a dot separated path.
///
/// Empty segments are kept, so `".a..b"` becomes `"b..a."`.
pub fn reverse_string(path: &str) -> String {
    path.split('.').rev().collect::<Vec<_>>().join(".")
}

/// Byte form of `reverse_string`
pub fn reverse_bytes(path: &[u8]) -> Vec<u8> {
    path.split(|&b| b == b'.')
        .rev()
        .collect::<Vec<_>>()
        .join(&b'.')
}

/// Routing decision for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No separator, or an empty last segment: nothing to anchor on
    ForcedForward,
    /// Last segment has wildcards
    Forward,
    /// Last segment is literal
    Reverse,
}

impl Classification {
    pub fn is_reverse(self) -> bool {
        self == Classification::Reverse
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::ForcedForward => write!(f, "forced-forward"),
            Classification::Forward => write!(f, "forward"),
            Classification::Reverse => write!(f, "reverse"),
        }
    }
}

/// Decide which tree `query` should run against
pub fn classify(query: &str) -> Classification {
    match query.rfind('.') {
        None => Classification::ForcedForward,
        Some(p) if p + 1 >= query.len() => Classification::ForcedForward,
        Some(p) if has_wildcard(&query[p + 1..]) => Classification::Forward,
        Some(_) => Classification::Reverse,
    }
}

/// Outcome of one routed query
///
/// Holds the routing decision next to the raw result, so listing never
/// depends on state left behind in the finder.
#[derive(Debug, Clone)]
pub struct ReverseExecution {
    classification: Classification,
    executed_query: String,
    result: FindResult,
}

impl ReverseExecution {
    /// Result of a query that ran against the forward tree only
    pub(crate) fn forward(query: &str, result: FindResult) -> Self {
        Self {
            classification: Classification::ForcedForward,
            executed_query: query.to_string(),
            result,
        }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Whether the reverse tree answered this query
    pub fn is_reversed(&self) -> bool {
        self.classification.is_reverse()
    }

    /// Query string as sent to the chosen tree
    pub fn executed_query(&self) -> &str {
        &self.executed_query
    }

    /// All matched names in forward orientation
    pub fn list(&self) -> Vec<Bytes> {
        self.normalize(self.result.list())
    }

    /// Matched leaf names in forward orientation
    pub fn series(&self) -> Vec<Bytes> {
        self.normalize(self.result.series())
    }

    pub fn abs(&self, name: Bytes) -> Bytes {
        name
    }

    /// Forward oriented result
    pub fn into_result(self) -> FindResult {
        if self.is_reversed() {
            self.result.map_names(|n| Bytes::from(reverse_bytes(n)))
        } else {
            self.result
        }
    }

    fn normalize(&self, names: &[Bytes]) -> Vec<Bytes> {
        if self.is_reversed() {
            names.iter().map(|n| Bytes::from(reverse_bytes(n))).collect()
        } else {
            names.to_vec()
        }
    }
}

/// Finder that sends literal-suffix queries to a reverse tree
#[derive(Debug, Clone)]
pub struct ReverseFinder<W, R = BaseFinder> {
    wrapped: W,
    reverse: R,
}

impl<W: Finder> ReverseFinder<W, BaseFinder> {
    /// Wrap `wrapped`, answering reversible queries from the reverse
    /// tree `table` at the ClickHouse `url`
    pub fn wrap(wrapped: W, url: &str, table: &str, timeout: Duration) -> FinderResult<Self> {
        Ok(Self::with_reverse(
            wrapped,
            BaseFinder::new(url, table, timeout)?,
        ))
    }
}

impl<W: Finder, R: Finder> ReverseFinder<W, R> {
    /// Wrap `wrapped` with an arbitrary reverse-indexed source
    pub fn with_reverse(wrapped: W, reverse: R) -> Self {
        Self { wrapped, reverse }
    }

    /// Classify `query` and run it against the matching source.
    ///
    /// Failures of the chosen source are returned as is; there is no
    /// fallback to the other tree.
    pub async fn route(&self, query: &str, from: i64, until: i64) -> FinderResult<ReverseExecution> {
        let classification = classify(query);

        let (executed_query, result) = if classification.is_reverse() {
            let reversed = reverse_string(query);
            let result = self.reverse.execute(&reversed, from, until).await?;
            (reversed, result)
        } else {
            let result = self.wrapped.execute(query, from, until).await?;
            (query.to_string(), result)
        };

        tracing::debug!(
            query = %query,
            executed = %executed_query,
            classification = %classification,
            names = result.list().len(),
            "Routed metric path query"
        );

        Ok(ReverseExecution {
            classification,
            executed_query,
            result,
        })
    }
}

#[async_trait]
impl<W: Finder, R: Finder> Finder for ReverseFinder<W, R> {
    async fn execute(&self, query: &str, from: i64, until: i64) -> FinderResult<FindResult> {
        Ok(self.route(query, from, until).await?.into_result())
    }

    fn abs(&self, name: Bytes) -> Bytes {
        name
    }
}
