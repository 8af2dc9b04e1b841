//! # OxiDat Codec
//!
//! Pure Rust implementation of the bit-oriented LZ scheme used inside DAT
//! resource containers.
//!
//! The format is unusual in that everything runs backward: the compressed
//! payload is consumed from its last byte toward its first, and the output
//! buffer is filled from its end toward its start. Back-reference offsets are
//! measured from the backward write cursor.
//!
//! - [`decode`]: Token interpreter driving a [`BitCursor`](oxidat_core::BitCursor)
//!   and an [`OutputAssembler`]
//! - [`encode`]: Raw-token encoder for fixtures and re-packing
//! - [`token`]: The six-way token prefix code
//! - [`output`]: Backward-filling output buffer
//!
//! ## Example
//!
//! ```rust
//! use oxidat_codec::{compress, decompress};
//!
//! let original = b"Let's go!";
//! let encoded = compress(original).unwrap();
//! let decoded = decompress(&encoded.payload, &encoded.params()).unwrap();
//! assert_eq!(decoded, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod config;
pub mod decode;
pub mod encode;
pub mod output;
pub mod token;

pub use config::DecodeConfig;
pub use decode::{DecodedSegment, SegmentDecoder, SegmentParams, decompress};
pub use encode::{EncodedSegment, SegmentEncoder, compress};
pub use output::OutputAssembler;
pub use token::{BACK_REF_MAX, LONG_RAW_MAX, LONG_RAW_MIN, SHORT_RAW_MAX, Token};
