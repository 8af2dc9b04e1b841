//! Segment descriptors.

use crate::header::{HEADER_SIZE, SegmentHeader};
use oxidat_codec::SegmentParams;
use std::sync::OnceLock;

/// Metadata for one compressed segment, plus its decoded bytes once
/// requested.
#[derive(Debug)]
pub struct Segment {
    index: usize,
    header: SegmentHeader,
    offset: usize,
    pub(crate) decoded: OnceLock<Vec<u8>>,
}

impl Segment {
    pub(crate) fn new(index: usize, header_offset: usize, header: SegmentHeader) -> Self {
        Self {
            index,
            header,
            offset: header_offset + HEADER_SIZE,
            decoded: OnceLock::new(),
        }
    }

    /// Position within the container.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Absolute offset of the compressed payload (just past the header).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Absolute offset of the header.
    pub fn header_offset(&self) -> usize {
        self.offset - HEADER_SIZE
    }

    /// Size of the compressed payload.
    pub fn compressed_size(&self) -> usize {
        self.header.compressed_size()
    }

    /// Size of the decoded data.
    pub fn decompressed_size(&self) -> usize {
        usize::from(self.header.decompressed_size)
    }

    /// Declared XOR checksum.
    pub fn checksum(&self) -> u8 {
        self.header.checksum
    }

    /// Valid bits in the first consumed payload byte.
    pub fn initial_bits(&self) -> u8 {
        self.header.initial_bits
    }

    /// Unidentified header word at offset 6.
    pub fn unknown0(&self) -> u16 {
        self.header.unknown0
    }

    /// Unidentified header word at offset 2.
    pub fn unknown1(&self) -> u16 {
        self.header.unknown1
    }

    /// The header this descriptor was built from.
    pub fn header(&self) -> &SegmentHeader {
        &self.header
    }

    /// Decoder parameters for this segment.
    pub fn params(&self) -> SegmentParams {
        self.header.params()
    }

    /// Whether the decoded bytes are cached.
    pub fn is_decoded(&self) -> bool {
        self.decoded.get().is_some()
    }

    /// Plain snapshot of this descriptor.
    pub fn info(&self) -> SegmentInfo {
        SegmentInfo {
            index: self.index,
            offset: self.offset,
            compressed_size: self.compressed_size(),
            decompressed_size: self.decompressed_size(),
            checksum: self.checksum(),
            initial_bits: self.initial_bits(),
            unknown0: self.unknown0(),
            unknown1: self.unknown1(),
        }
    }
}

/// Descriptor fields without the decode cache, for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SegmentInfo {
    /// Position within the container.
    pub index: usize,
    /// Absolute payload offset.
    pub offset: usize,
    /// Payload size.
    pub compressed_size: usize,
    /// Decoded size.
    pub decompressed_size: usize,
    /// Declared checksum.
    pub checksum: u8,
    /// Valid bits in the first consumed payload byte.
    pub initial_bits: u8,
    /// Unidentified header word at offset 6.
    pub unknown0: u16,
    /// Unidentified header word at offset 2.
    pub unknown1: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_fields() {
        let header = SegmentHeader {
            initial_bits: 3,
            checksum: 0x5C,
            unknown1: 0xBEEF,
            decompressed_size: 40,
            unknown0: 0xCAFE,
            total_size: 30,
        };
        let segment = Segment::new(2, 100, header);

        assert_eq!(segment.index(), 2);
        assert_eq!(segment.header_offset(), 100);
        assert_eq!(segment.offset(), 110);
        assert_eq!(segment.compressed_size(), 20);
        assert_eq!(segment.decompressed_size(), 40);
        assert!(!segment.is_decoded());

        let info = segment.info();
        assert_eq!(info.unknown0, 0xCAFE);
        assert_eq!(info.unknown1, 0xBEEF);
        assert_eq!(info.checksum, 0x5C);
        assert_eq!(info.initial_bits, 3);
    }
}
