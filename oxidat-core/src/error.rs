//! Error types for OxiDat operations.
//!
//! Only caller contract violations and I/O failures are errors. Anomalies in
//! the archive data itself (bad headers, checksum mismatches, truncated
//! streams) are tolerated and reported through
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink) instead.

use std::io;
use thiserror::Error;

/// The main error type for OxiDat operations.
#[derive(Debug, Error)]
pub enum OxiDatError {
    /// I/O error while loading an archive.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bit count outside `1..=32` requested from a bit cursor.
    #[error("Invalid bit count: {count} (must be 1-32)")]
    InvalidBitCount {
        /// The requested number of bits.
        count: u32,
    },

    /// Initial bit count outside `1..=8` for a bit cursor.
    #[error("Invalid initial bit count: {count} (must be 1-8)")]
    InvalidInitialBits {
        /// The requested number of valid bits in the first byte.
        count: u32,
    },

    /// Integer width outside `1..=4` bytes.
    #[error("Invalid integer width: {width} bytes (must be 1-4)")]
    InvalidIntWidth {
        /// The requested width in bytes.
        width: usize,
    },

    /// A window does not fit inside its backing buffer.
    #[error("Window out of bounds: offset {offset} + length {length} exceeds {available} bytes")]
    WindowOutOfBounds {
        /// Window start within the backing buffer.
        offset: usize,
        /// Window length.
        length: usize,
        /// Size of the backing buffer.
        available: usize,
    },

    /// Segment index past the end of the container.
    #[error("Segment not found: index {index} (container has {count} segments)")]
    SegmentNotFound {
        /// The requested index.
        index: usize,
        /// Number of segments in the container.
        count: usize,
    },

    /// A token shape that the format cannot express.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of the token problem.
        message: String,
    },

    /// A value does not fit in its header field.
    #[error("Field overflow: {field} = {value} exceeds maximum {max}")]
    FieldOverflow {
        /// Name of the header field.
        field: &'static str,
        /// The value that was to be stored.
        value: usize,
        /// Largest value the field can hold.
        max: usize,
    },
}

/// Result type alias for OxiDat operations.
pub type Result<T> = std::result::Result<T, OxiDatError>;

impl OxiDatError {
    /// Create an invalid bit count error.
    pub fn invalid_bit_count(count: u32) -> Self {
        Self::InvalidBitCount { count }
    }

    /// Create an invalid initial bit count error.
    pub fn invalid_initial_bits(count: u32) -> Self {
        Self::InvalidInitialBits { count }
    }

    /// Create an invalid integer width error.
    pub fn invalid_int_width(width: usize) -> Self {
        Self::InvalidIntWidth { width }
    }

    /// Create a window out of bounds error.
    pub fn window_out_of_bounds(offset: usize, length: usize, available: usize) -> Self {
        Self::WindowOutOfBounds {
            offset,
            length,
            available,
        }
    }

    /// Create a segment not found error.
    pub fn segment_not_found(index: usize, count: usize) -> Self {
        Self::SegmentNotFound { index, count }
    }

    /// Create an invalid token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create a field overflow error.
    pub fn field_overflow(field: &'static str, value: usize, max: usize) -> Self {
        Self::FieldOverflow { field, value, max }
    }
}
