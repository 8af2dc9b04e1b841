//! DAT segment header.
//!
//! Every segment starts with a 10-byte big-endian header:
//!
//! ```text
//! offset 0: initial_bits      u8   valid bits in the payload's last byte
//! offset 1: checksum          u8   XOR of all payload bytes
//! offset 2: unknown1          u16
//! offset 4: decompressed_size u16
//! offset 6: unknown0          u16
//! offset 8: total_size        u16  header + payload
//! offset 10: payload[total_size - 10]
//! ```
//!
//! The two unknown words have never been identified. They are carried
//! through unchanged.

use oxidat_codec::{EncodedSegment, SegmentParams};
use oxidat_core::cursor::ByteCursor;
use oxidat_core::error::{OxiDatError, Result};

/// Size of a segment header in bytes.
pub const HEADER_SIZE: usize = 10;

/// Largest total segment size a header may declare.
pub const MAX_SEGMENT_SIZE: usize = 0xFF_FFFF;

/// Parsed segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentHeader {
    /// Valid bits in the payload's last byte (1-8).
    pub initial_bits: u8,
    /// Declared XOR checksum of the payload.
    pub checksum: u8,
    /// Unidentified word at offset 2.
    pub unknown1: u16,
    /// Size of the decompressed data.
    pub decompressed_size: u16,
    /// Unidentified word at offset 6.
    pub unknown0: u16,
    /// Header plus payload size.
    pub total_size: u16,
}

impl SegmentHeader {
    /// Read a header at the cursor's current position.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Self {
        Self {
            initial_bits: cursor.read_byte(None),
            checksum: cursor.read_byte(None),
            unknown1: cursor.read_word_be(None),
            decompressed_size: cursor.read_word_be(None),
            unknown0: cursor.read_word_be(None),
            total_size: cursor.read_word_be(None),
        }
    }

    /// Build the header for an encoded segment.
    pub fn for_encoded(encoded: &EncodedSegment, unknown0: u16, unknown1: u16) -> Result<Self> {
        let decompressed_size = u16::try_from(encoded.decompressed_size).map_err(|_| {
            OxiDatError::field_overflow(
                "decompressed_size",
                encoded.decompressed_size,
                usize::from(u16::MAX),
            )
        })?;
        Ok(Self {
            initial_bits: encoded.initial_bits,
            checksum: encoded.checksum,
            unknown1,
            decompressed_size,
            unknown0,
            total_size: total_size_for(encoded.payload.len())?,
        })
    }

    /// Payload size implied by `total_size`.
    pub fn compressed_size(&self) -> usize {
        usize::from(self.total_size).saturating_sub(HEADER_SIZE)
    }

    /// Decoder parameters carried by this header.
    pub fn params(&self) -> SegmentParams {
        SegmentParams {
            initial_bits: self.initial_bits,
            checksum: self.checksum,
            decompressed_size: usize::from(self.decompressed_size),
        }
    }

    /// Check the declared segment size. Returns a description of the
    /// problem.
    ///
    /// Other fields are not checked: a truncated payload or an odd
    /// `initial_bits` is left to the decoder, which tolerates both.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let total = usize::from(self.total_size);
        if total < HEADER_SIZE {
            return Err(format!("segment size {total} below header size {HEADER_SIZE}"));
        }
        if total > MAX_SEGMENT_SIZE {
            return Err(format!("segment size {total} above {MAX_SEGMENT_SIZE}"));
        }
        Ok(())
    }

    /// Serialize to the 10-byte wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0] = self.initial_bits;
        out[1] = self.checksum;
        out[2..4].copy_from_slice(&self.unknown1.to_be_bytes());
        out[4..6].copy_from_slice(&self.decompressed_size.to_be_bytes());
        out[6..8].copy_from_slice(&self.unknown0.to_be_bytes());
        out[8..10].copy_from_slice(&self.total_size.to_be_bytes());
        out
    }

    /// Append the wire form to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}

/// `total_size` field value for a payload of `payload_len` bytes.
pub(crate) fn total_size_for(payload_len: usize) -> Result<u16> {
    let total = payload_len + HEADER_SIZE;
    u16::try_from(total)
        .map_err(|_| OxiDatError::field_overflow("total_size", total, usize::from(u16::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxidat_core::diagnostics::Diagnostics;

    fn sample() -> SegmentHeader {
        SegmentHeader {
            initial_bits: 5,
            checksum: 0xA7,
            unknown1: 0x0102,
            decompressed_size: 0x0304,
            unknown0: 0x0506,
            total_size: 0x0020,
        }
    }

    #[test]
    fn test_wire_layout() {
        assert_eq!(
            sample().to_bytes(),
            [0x05, 0xA7, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x20]
        );
    }

    #[test]
    fn test_read_matches_write() {
        let mut bytes = vec![0xFF; 3];
        sample().write(&mut bytes);
        let mut cursor = ByteCursor::new(&bytes, Diagnostics::null());
        cursor.set_offset(3);
        assert_eq!(SegmentHeader::read(&mut cursor), sample());
        assert_eq!(cursor.offset(), 13);
    }

    #[test]
    fn test_sizes_and_params() {
        let header = sample();
        assert_eq!(header.compressed_size(), 0x20 - 10);
        let params = header.params();
        assert_eq!(params.initial_bits, 5);
        assert_eq!(params.checksum, 0xA7);
        assert_eq!(params.decompressed_size, 0x0304);
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let small = SegmentHeader {
            total_size: 9,
            ..sample()
        };
        assert!(small.validate().unwrap_err().contains("below header size"));

        let minimal = SegmentHeader {
            total_size: 10,
            ..sample()
        };
        assert!(minimal.validate().is_ok());

        // Left to the decoder.
        let odd_bits = SegmentHeader {
            initial_bits: 0,
            ..sample()
        };
        assert!(odd_bits.validate().is_ok());
    }

    #[test]
    fn test_for_encoded() {
        let encoded = oxidat_codec::compress(b"header").unwrap();
        let header = SegmentHeader::for_encoded(&encoded, 7, 9).unwrap();
        assert_eq!(header.compressed_size(), encoded.payload.len());
        assert_eq!(header.decompressed_size, 6);
        assert_eq!(header.unknown0, 7);
        assert_eq!(header.unknown1, 9);
        assert_eq!(header.params(), encoded.params());
    }

    #[test]
    fn test_for_encoded_overflow() {
        let encoded = oxidat_codec::compress(&vec![0u8; 70_000]).unwrap();
        assert!(matches!(
            SegmentHeader::for_encoded(&encoded, 0, 0),
            Err(OxiDatError::FieldOverflow {
                field: "decompressed_size",
                ..
            })
        ));

        // Fits as decompressed size, but the raw-token payload does not.
        let encoded = oxidat_codec::compress(&vec![0u8; 65_535]).unwrap();
        assert!(matches!(
            SegmentHeader::for_encoded(&encoded, 0, 0),
            Err(OxiDatError::FieldOverflow {
                field: "total_size",
                ..
            })
        ));
    }
}
