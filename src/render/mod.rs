//! Points rendering
//!
//! Turns the RowBinary response of a points query into a sortable
//! collection of samples:
//!
//! - **varint**: uvarint length prefixes
//! - **data**: record counting, decoding and name interning
//! - **point**: the decoded sample type
//! - **fetch**: building and running the points query
//! - **error**: decode and fetch errors
//!
//! # Decode path
//!
//! ```text
//! body → data_count (size) → Data::parse (intern, un-reverse) → Data::sort
//! ```

pub mod data;
mod error;
mod fetch;
mod point;
pub mod varint;

pub use data::{data_count, Data};
pub use error::{DecodeError, DecodeResult, RenderError, RenderResult};
pub use fetch::PointsQuery;
pub use point::Point;
pub use varint::{put_uvarint, read_uvarint};
