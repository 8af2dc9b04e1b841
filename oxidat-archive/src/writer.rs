//! DAT container writing.

use crate::container::Container;
use crate::header::{SegmentHeader, total_size_for};
use oxidat_codec::{EncodedSegment, SegmentEncoder};
use oxidat_core::error::Result;

/// Builds a container by appending segments.
#[derive(Debug, Default)]
pub struct ContainerWriter {
    buffer: Vec<u8>,
    segments: usize,
    encoder: SegmentEncoder,
}

impl ContainerWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress `data` and append it as a new segment. Returns its index.
    pub fn add(&mut self, data: &[u8]) -> Result<usize> {
        let encoded = self.encoder.encode(data)?;
        self.add_encoded(&encoded, 0, 0)
    }

    /// Append an already encoded segment with the given unknown header words.
    pub fn add_encoded(
        &mut self,
        encoded: &EncodedSegment,
        unknown0: u16,
        unknown1: u16,
    ) -> Result<usize> {
        let header = SegmentHeader::for_encoded(encoded, unknown0, unknown1)?;
        Ok(self.push(&header, &encoded.payload))
    }

    /// Append a header and payload as they are, fixing up only `total_size`.
    pub fn add_verbatim(&mut self, header: &SegmentHeader, payload: &[u8]) -> Result<usize> {
        let header = SegmentHeader {
            total_size: total_size_for(payload.len())?,
            ..*header
        };
        Ok(self.push(&header, payload))
    }

    /// Copy segment `index` of `container` without re-encoding it.
    pub fn copy_from(&mut self, container: &Container, index: usize) -> Result<usize> {
        let header = *container.header(index)?;
        let payload = container.raw_payload(index)?;
        self.add_verbatim(&header, payload)
    }

    /// Number of segments written so far.
    pub fn len(&self) -> usize {
        self.segments
    }

    /// Whether no segments were written.
    pub fn is_empty(&self) -> bool {
        self.segments == 0
    }

    /// Finish and return the container bytes.
    pub fn finish(self) -> Vec<u8> {
        tracing::debug!(
            segments = self.segments,
            size = self.buffer.len(),
            "wrote container"
        );
        self.buffer
    }

    fn push(&mut self, header: &SegmentHeader, payload: &[u8]) -> usize {
        header.write(&mut self.buffer);
        self.buffer.extend_from_slice(payload);
        self.segments += 1;
        self.segments - 1
    }
}

/// Compress each buffer into one segment of a new container.
pub fn pack(buffers: &[&[u8]]) -> Result<Vec<u8>> {
    let mut writer = ContainerWriter::new();
    for data in buffers {
        writer.add(data)?;
    }
    Ok(writer.finish())
}
