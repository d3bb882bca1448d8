//! ClickHouse transport
//!
//! Thin HTTP client shared by the tree finders and the points fetcher.

mod client;
mod error;

pub use client::ClickHouseClient;
pub use error::{ClickHouseError, ClickHouseResult};

/// Quote `value` as a ClickHouse single-quoted string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
