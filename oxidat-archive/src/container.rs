//! DAT container parsing.
//!
//! A container is a plain concatenation of segments with no global header:
//!
//! ```text
//! +---------+----------+---------+----------+-----
//! | header0 | payload0 | header1 | payload1 | ...
//! +---------+----------+---------+----------+-----
//! ```
//!
//! Parsing only walks the headers. Payloads are decoded on request and,
//! under [`CachePolicy::Memoize`], decoded once per segment.

use crate::config::{CachePolicy, ContainerConfig};
use crate::header::{HEADER_SIZE, SegmentHeader};
use crate::segment::Segment;
use oxidat_codec::{DecodedSegment, SegmentDecoder};
use oxidat_core::cursor::ByteCursor;
use oxidat_core::diagnostics::{Anomaly, DiagnosticSink, Diagnostics, TracingSink};
use oxidat_core::error::{OxiDatError, Result};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Bytes backing a container.
enum Backing {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(memmap2::Mmap),
}

impl Backing {
    fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Owned(data) => data,
            #[cfg(feature = "mmap")]
            Backing::Mapped(map) => map,
        }
    }
}

/// A parsed DAT container.
pub struct Container {
    name: String,
    data: Backing,
    segments: Vec<Segment>,
    sink: Arc<dyn DiagnosticSink>,
    config: ContainerConfig,
}

impl Container {
    /// Parse `data` with the default configuration, reporting anomalies
    /// through `tracing`.
    pub fn parse(data: Vec<u8>, name: impl Into<String>) -> Self {
        Self::parse_with(data, name, ContainerConfig::default(), Arc::new(TracingSink))
    }

    /// Parse `data` with an explicit configuration and diagnostic sink.
    pub fn parse_with(
        data: Vec<u8>,
        name: impl Into<String>,
        config: ContainerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self::from_backing(Backing::Owned(data), name.into(), config, sink)
    }

    /// Read and parse the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ContainerConfig::default(), Arc::new(TracingSink))
    }

    /// Read and parse the file at `path` with an explicit configuration and
    /// diagnostic sink.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        config: ContainerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::parse_with(data, source_name(path), config, sink))
    }

    /// Memory-map and parse the file at `path`.
    ///
    /// The file must not be modified while the container is alive.
    #[cfg(feature = "mmap")]
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        // SAFETY: read-only mapping; the caller keeps the file stable.
        #[allow(unsafe_code)]
        let map = unsafe { memmap2::Mmap::map(&file)? };
        Ok(Self::from_backing(
            Backing::Mapped(map),
            source_name(path),
            ContainerConfig::default(),
            Arc::new(TracingSink),
        ))
    }

    fn from_backing(
        data: Backing,
        name: String,
        config: ContainerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let segments = scan(data.as_slice(), &name, sink.as_ref());
        tracing::debug!(
            name = %name,
            size = data.as_slice().len(),
            segments = segments.len(),
            "parsed container"
        );
        Self {
            name,
            data,
            segments,
            sink,
            config,
        }
    }

    /// Number of segments found.
    pub fn count(&self) -> usize {
        self.segments.len()
    }

    /// Same as [`count`](Self::count).
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segments were found.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name used as the diagnostic source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The whole container buffer.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Active configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// All segment descriptors, in file order.
    pub fn descriptors(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over segment descriptors.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Descriptor of segment `index`.
    pub fn descriptor(&self, index: usize) -> Result<&Segment> {
        self.segments
            .get(index)
            .ok_or_else(|| OxiDatError::segment_not_found(index, self.segments.len()))
    }

    /// Header of segment `index`.
    pub fn header(&self, index: usize) -> Result<&SegmentHeader> {
        self.descriptor(index).map(Segment::header)
    }

    /// Compressed payload of segment `index`.
    ///
    /// Shorter than the declared size if the container is truncated.
    pub fn raw_payload(&self, index: usize) -> Result<&[u8]> {
        let segment = self.descriptor(index)?;
        let data = self.data();
        let end = (segment.offset() + segment.compressed_size()).min(data.len());
        Ok(&data[segment.offset().min(end)..end])
    }

    /// Decoded bytes of segment `index`.
    ///
    /// Under [`CachePolicy::Memoize`] the first call decodes and later calls
    /// borrow the cached buffer. Under [`CachePolicy::Fresh`] every call
    /// decodes into a new buffer.
    pub fn segment(&self, index: usize) -> Result<Cow<'_, [u8]>> {
        let segment = self.descriptor(index)?;
        match self.config.cache {
            CachePolicy::Memoize => {
                if let Some(data) = segment.decoded.get() {
                    return Ok(Cow::Borrowed(data));
                }
                let data = self.decode(index)?.data;
                Ok(Cow::Borrowed(segment.decoded.get_or_init(|| data)))
            }
            CachePolicy::Fresh => Ok(Cow::Owned(self.decode(index)?.data)),
        }
    }

    /// Decoded bytes of segment `index` in a new buffer, bypassing the cache.
    pub fn segment_owned(&self, index: usize) -> Result<Vec<u8>> {
        self.decode(index).map(|decoded| decoded.data)
    }

    /// Decode segment `index`, returning the full decoder result.
    ///
    /// Anomalies are reported under the source name `"<name>#<index>"`.
    pub fn decode(&self, index: usize) -> Result<DecodedSegment> {
        let segment = self.descriptor(index)?;
        let source = format!("{}#{}", self.name, index);
        let diag = Diagnostics::new(self.sink.as_ref(), &source);
        let cursor = ByteCursor::new(self.data(), diag);
        SegmentDecoder::new(self.config.decode).decode(
            &cursor,
            segment.offset(),
            segment.compressed_size(),
            &segment.params(),
        )
    }

    /// Decode every segment, in file order.
    pub fn decode_all(&self) -> Result<Vec<Cow<'_, [u8]>>> {
        (0..self.count()).map(|index| self.segment(index)).collect()
    }

    /// Decode every segment on the rayon thread pool, in file order.
    #[cfg(feature = "parallel")]
    pub fn decode_all_parallel(&self) -> Result<Vec<Cow<'_, [u8]>>> {
        use rayon::prelude::*;

        (0..self.count())
            .into_par_iter()
            .map(|index| self.segment(index))
            .collect()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("size", &self.data().len())
            .field("segments", &self.segments)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walk the segment headers of `data`.
fn scan(data: &[u8], name: &str, sink: &dyn DiagnosticSink) -> Vec<Segment> {
    let diag = Diagnostics::new(sink, name);
    let mut cursor = ByteCursor::new(data, diag);
    let mut segments = Vec::new();

    while !cursor.eof() {
        let offset = cursor.offset();
        let remaining = cursor.remaining();
        if remaining < HEADER_SIZE {
            diag.report(Anomaly::TrailingBytes {
                offset,
                count: remaining,
            });
            break;
        }

        let header = SegmentHeader::read(&mut cursor);
        if let Err(message) = header.validate() {
            diag.report(Anomaly::MalformedHeader { offset, message });
            break;
        }

        tracing::trace!(
            index = segments.len(),
            offset,
            compressed = header.compressed_size(),
            decompressed = header.decompressed_size,
            "found segment"
        );
        segments.push(Segment::new(segments.len(), offset, header));
        cursor.set_offset(offset + usize::from(header.total_size));
    }

    segments
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
