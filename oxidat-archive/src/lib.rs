//! # OxiDat Archive
//!
//! Reading and writing of DAT resource containers.
//!
//! A DAT file is a sequence of independently compressed segments, each with
//! a 10-byte header. [`Container`] walks the headers once and decodes
//! segments on demand; [`ContainerWriter`] builds new containers.
//!
//! Malformed data is tolerated wherever possible. Anomalies such as a bad
//! header, trailing garbage or a checksum mismatch are delivered to a
//! [`DiagnosticSink`](oxidat_core::DiagnosticSink) and parsing continues
//! with whatever could be recovered.
//!
//! ## Features
//!
//! - `mmap`: [`Container::open_mmap`] backed by a memory map
//! - `parallel`: [`Container::decode_all_parallel`] on the rayon pool
//! - `serde`: `Serialize` for [`SegmentInfo`]
//!
//! ## Example
//!
//! ```rust
//! use oxidat_archive::{Container, pack};
//!
//! let bytes = pack(&[b"ground", b"levels"]).unwrap();
//! let container = Container::parse(bytes, "MAIN.DAT");
//! assert_eq!(container.count(), 2);
//! assert_eq!(&*container.segment(1).unwrap(), b"levels");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![deny(unsafe_code)]

pub mod config;
pub mod container;
pub mod header;
pub mod segment;
pub mod writer;

pub use config::{CachePolicy, ContainerConfig};
pub use container::Container;
pub use header::{HEADER_SIZE, MAX_SEGMENT_SIZE, SegmentHeader};
pub use segment::{Segment, SegmentInfo};
pub use writer::{ContainerWriter, pack};

// Re-exports so callers need only this crate.
pub use oxidat_codec::{DecodeConfig, DecodedSegment};
pub use oxidat_core::{Anomaly, CollectingSink, DiagnosticSink, NullSink, OxiDatError, Result, TracingSink};
