//! Decoded time-series samples

use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// A single sample decoded from the points table
///
/// `metric` is shared by every point of the same series within one
/// decoded response, so cloning a point never copies the name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// Interned series ID, unique per decode. Never 0 once decoded.
    pub metric_id: u32,
    /// Canonical (forward-oriented) metric path
    pub metric: Arc<str>,
    /// Sample time bucket
    pub time: i32,
    /// Sample value
    pub value: f64,
    /// Wall-clock time the sample was written
    pub timestamp: i32,
}

impl Point {
    /// Create a point that has not been interned yet
    pub fn new(metric: impl Into<Arc<str>>, time: i32, value: f64, timestamp: i32) -> Self {
        Self {
            metric_id: 0,
            metric: metric.into(),
            time,
            value,
            timestamp,
        }
    }

    /// Grouping order: series ID, then time.
    pub fn order(&self, other: &Point) -> Ordering {
        self.metric_id
            .cmp(&other.metric_id)
            .then(self.time.cmp(&other.time))
    }
}
