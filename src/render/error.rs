//! Render error types
//!
//! Decoding failures are fatal for the whole response: no partial
//! `Data` is ever returned.

use thiserror::Error;

use crate::clickhouse::ClickHouseError;

/// Errors that can occur while decoding a RowBinary points response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ended before the terminating varint byte
    #[error("ReadUvarint: malformed array, needed at least {consumed} bytes")]
    VarintTruncated { consumed: usize },

    /// Varint does not fit in 64 bits
    #[error("ReadUvarint: varint overflows a 64-bit integer after {consumed} bytes")]
    VarintOverflow { consumed: usize },

    /// Record boundaries disagree with the buffer length
    #[error("Malformed response from clickhouse at offset {offset}")]
    MalformedResponse { offset: usize },
}

/// Errors that can occur while fetching and decoding points
#[derive(Error, Debug)]
pub enum RenderError {
    /// Points query failed
    #[error("Points query failed: {0}")]
    Query(#[from] ClickHouseError),

    /// Response could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type alias for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type alias for render operations
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::MalformedResponse { offset: 18 };
        assert_eq!(
            err.to_string(),
            "Malformed response from clickhouse at offset 18"
        );

        let err = DecodeError::VarintOverflow { consumed: 11 };
        assert!(err.to_string().contains("overflows a 64-bit integer"));
    }

    #[test]
    fn test_decode_error_conversion() {
        let err: RenderError = DecodeError::VarintTruncated { consumed: 1 }.into();
        assert!(matches!(
            err,
            RenderError::Decode(DecodeError::VarintTruncated { consumed: 1 })
        ));
    }
}
