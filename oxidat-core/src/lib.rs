//! # OxiDat Core
//!
//! Core components for the OxiDat DAT container codec.
//!
//! This crate provides the fundamental building blocks:
//!
//! - [`cursor`]: Windowed byte cursor with tolerant out-of-range reads
//! - [`bitstream`]: Backward bit reader/writer used by segment payloads
//! - [`checksum`]: XOR-fold checksum declared in segment headers
//! - [`diagnostics`]: Sinks for tolerated data anomalies
//! - [`error`]: Error types for caller contract violations
//!
//! ## Architecture
//!
//! OxiDat is split into three layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Container (oxidat-archive)                          │
//! │     Segment header scan, lazy decode, re-packing        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec (oxidat-codec)                                │
//! │     Token interpreter, backward output, raw encoder     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     ByteCursor, BitCursor, XorChecksum, Diagnostics     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxidat_core::{BitCursor, ByteCursor, Diagnostics};
//!
//! let data = [0xAA, 0x55];
//! let source = ByteCursor::new(&data, Diagnostics::null());
//! let mut bits = BitCursor::new(&source, 0, data.len(), 8).unwrap();
//!
//! assert_eq!(bits.read(8).unwrap(), 0xAA);
//! assert_eq!(bits.read(8).unwrap(), 0x55);
//! assert_eq!(bits.checksum(), 0xFF);
//! assert!(bits.eof());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod checksum;
pub mod cursor;
pub mod diagnostics;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitCursor, BitStreamWriter};
pub use checksum::XorChecksum;
pub use cursor::ByteCursor;
pub use diagnostics::{
    Anomaly, CollectingSink, DiagnosticSink, Diagnostics, NullSink, TracingSink,
};
pub use error::{OxiDatError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitCursor, BitStreamWriter};
    pub use crate::checksum::XorChecksum;
    pub use crate::cursor::ByteCursor;
    pub use crate::diagnostics::{Anomaly, DiagnosticSink, Diagnostics};
    pub use crate::error::{OxiDatError, Result};
}
