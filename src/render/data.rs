//! RowBinary points response decoding
//!
//! The points query returns an unframed sequence of records:
//!
//! ```text
//! record := uvarint(name_len) name[name_len] time:u32le value:f64le timestamp:u32le
//! ```
//!
//! End of buffer is the only terminator, so the buffer must be consumed
//! exactly. Decoding is done in two passes: `data_count` walks the record
//! boundaries to size the destination, then `Data::parse` fills it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::finder::reverse_bytes;
use crate::render::error::{DecodeError, DecodeResult};
use crate::render::point::Point;
use crate::render::varint::read_uvarint;

/// time(4) + value(8) + timestamp(4)
pub const RECORD_TAIL_LEN: usize = 16;

/// Count records in `body` without decoding them.
pub fn data_count(body: &[u8]) -> DecodeResult<usize> {
    let mut count = 0;
    let mut offset = 0;

    while offset < body.len() {
        let (name_len, read) = read_uvarint(&body[offset..])?;
        offset = usize::try_from(name_len)
            .ok()
            .and_then(|len| offset.checked_add(read)?.checked_add(len))
            .and_then(|end| end.checked_add(RECORD_TAIL_LEN))
            .ok_or(DecodeError::MalformedResponse { offset })?;
        count += 1;
    }

    if offset == body.len() {
        Ok(count)
    } else {
        Err(DecodeError::MalformedResponse { offset })
    }
}

/// Decoded points plus the name interning table for one response
#[derive(Debug, Default, Clone)]
pub struct Data {
    /// Decoded samples, extra points first
    pub points: Vec<Point>,
    /// Alias names per metric, filled in by callers after decoding
    pub aliases: HashMap<String, Vec<String>>,
    /// Keyed on the raw wire name so names differing only in invalid
    /// UTF-8 bytes stay distinct series
    name_to_id: HashMap<Box<[u8]>, (Arc<str>, u32)>,
    max_id: u32,
}

impl Data {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Decode a full RowBinary body.
    ///
    /// `extra_points` are placed first and share the ID space with the
    /// decoded series. With `is_reverse` set, every decoded name is
    /// turned back into forward orientation.
    pub fn parse(body: &[u8], extra_points: &[Point], is_reverse: bool) -> DecodeResult<Self> {
        let count = data_count(body)?;
        let mut data = Self::with_capacity(count + extra_points.len());

        for point in extra_points {
            let (_, metric_id) = data.intern(point.metric.as_bytes());
            data.points.push(Point {
                metric_id,
                ..point.clone()
            });
        }

        let mut offset = 0;
        let mut last_name: Option<&[u8]> = None;
        let mut metric: Arc<str> = Arc::from("");
        let mut metric_id = 0;

        while offset < body.len() {
            let (name_len, read) = read_uvarint(&body[offset..])
                .map_err(|_| DecodeError::MalformedResponse { offset })?;
            offset += read;

            let name_len = usize::try_from(name_len)
                .map_err(|_| DecodeError::MalformedResponse { offset })?;
            if body.len() - offset < name_len.saturating_add(RECORD_TAIL_LEN) {
                return Err(DecodeError::MalformedResponse { offset });
            }

            let name = &body[offset..offset + name_len];
            offset += name_len;

            // Rows of one series usually arrive back to back
            if last_name != Some(name) {
                last_name = Some(name);
                (metric, metric_id) = if is_reverse {
                    data.intern(&reverse_bytes(name))
                } else {
                    data.intern(name)
                };
            }

            let time = read_u32_le(body, offset);
            let value = f64::from_bits(read_u64_le(body, offset + 4));
            let timestamp = read_u32_le(body, offset + 12);
            offset += RECORD_TAIL_LEN;

            data.points.push(Point {
                metric_id,
                metric: Arc::clone(&metric),
                time: time as i32,
                value,
                timestamp: timestamp as i32,
            });
        }

        tracing::debug!(
            points = data.points.len(),
            series = data.max_id,
            bytes = body.len(),
            "Decoded points response"
        );

        Ok(data)
    }

    /// Return the ID for `name`, assigning the next one if unseen.
    pub fn name_to_id(&mut self, name: &str) -> u32 {
        self.intern(name.as_bytes()).1
    }

    /// Look up an already assigned ID
    pub fn metric_id(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name.as_bytes()).map(|(_, id)| *id)
    }

    /// Highest ID assigned so far (0 when nothing is interned)
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    fn intern(&mut self, name: &[u8]) -> (Arc<str>, u32) {
        if let Some((metric, id)) = self.name_to_id.get(name) {
            return (Arc::clone(metric), *id);
        }

        self.max_id += 1;
        let metric: Arc<str> = Arc::from(String::from_utf8_lossy(name).as_ref());
        self.name_to_id
            .insert(Box::from(name), (Arc::clone(&metric), self.max_id));
        (metric, self.max_id)
    }

    /// Register `alias` as another name for `metric`
    pub fn add_alias(&mut self, metric: impl Into<String>, alias: impl Into<String>) {
        self.aliases
            .entry(metric.into())
            .or_default()
            .push(alias.into());
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether point `i` sorts before point `j`
    pub fn less(&self, i: usize, j: usize) -> bool {
        self.points[i].order(&self.points[j]).is_lt()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.points.swap(i, j);
    }

    /// Sort in place by series ID, then time
    pub fn sort(&mut self) {
        self.points.sort_unstable_by(Point::order);
    }
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn read_u64_le(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}
