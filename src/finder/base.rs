//! Tree-table finder
//!
//! Resolves a glob against a table of metric paths (one row per leaf
//! and per branch, branches carrying a trailing `.`). The same finder
//! serves the forward tree and, fed reversed queries, the reverse tree.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::clickhouse::ClickHouseClient;
use crate::finder::error::{FinderError, FinderResult};
use crate::finder::glob::{glob_condition, level};
use crate::finder::{FindResult, Finder};

/// Finder backed by a single tree table
#[derive(Debug, Clone)]
pub struct BaseFinder {
    client: ClickHouseClient,
    table: String,
}

impl BaseFinder {
    /// Create a finder over `table` at the ClickHouse `url`
    pub fn new(url: &str, table: impl Into<String>, timeout: Duration) -> FinderResult<Self> {
        let client = ClickHouseClient::new(url, timeout)?;
        Ok(Self::with_client(client, table))
    }

    /// Create a finder sharing an existing client
    pub fn with_client(client: ClickHouseClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// WHERE clause selecting the rows matched by `query`
    pub fn where_clause(query: &str) -> String {
        let mut clause = format!("Level = {}", level(query));
        if let Some(cond) = glob_condition("Path", query) {
            clause.push_str(" AND ");
            clause.push_str(&cond);
        }
        clause
    }

    /// Full SQL statement for `query`
    pub fn sql(&self, query: &str) -> String {
        format!(
            "SELECT Path FROM {} WHERE {} GROUP BY Path FORMAT TabSeparatedRaw",
            self.table,
            Self::where_clause(query)
        )
    }
}

#[async_trait]
impl Finder for BaseFinder {
    async fn execute(&self, query: &str, _from: i64, _until: i64) -> FinderResult<FindResult> {
        if self.table.is_empty() {
            return Err(FinderError::Config("tree table is not set".to_string()));
        }

        let body = self.client.query(&self.sql(query)).await?;
        Ok(FindResult::from_body(body))
    }

    fn abs(&self, name: Bytes) -> Bytes {
        name
    }
}
