//! Segment compression (raw tokens only).
//!
//! The encoder produces streams any DAT decoder accepts, without searching
//! for matches: the input is cut into raw tokens from its end toward its
//! start. It exists to build fixtures and to re-pack edited resources, so
//! output is slightly larger than the input.

use crate::decode::SegmentParams;
use crate::token::{LONG_RAW_MAX, SHORT_RAW_MAX, Token};
use oxidat_core::bitstream::BitStreamWriter;
use oxidat_core::checksum::XorChecksum;
use oxidat_core::error::Result;

/// Output of [`SegmentEncoder::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSegment {
    /// Packed payload, consumed by the decoder from its last byte backward.
    pub payload: Vec<u8>,
    /// XOR of all payload bytes.
    pub checksum: u8,
    /// Valid bits in the payload's last byte, 1-8.
    pub initial_bits: u8,
    /// Length of the original input.
    pub decompressed_size: usize,
    /// Number of tokens emitted.
    pub tokens: usize,
}

impl EncodedSegment {
    /// Header fields a decoder needs to reverse this encoding.
    pub fn params(&self) -> SegmentParams {
        SegmentParams {
            initial_bits: self.initial_bits,
            checksum: self.checksum,
            decompressed_size: self.decompressed_size,
        }
    }
}

/// Raw-token segment compressor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentEncoder;

impl SegmentEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode `data` as a sequence of raw tokens.
    pub fn encode(&self, data: &[u8]) -> Result<EncodedSegment> {
        // 8 bits per literal plus at most 11 header bits per 9+ byte token.
        let mut writer = BitStreamWriter::with_capacity(data.len() * 8 + data.len() / 8 * 5 + 16);
        let mut end = data.len();
        let mut tokens = 0;

        // The decoder fills its output from the end, so the last chunk goes
        // first and each chunk's bytes are written last to first.
        while end > 0 {
            let length = if end <= SHORT_RAW_MAX {
                end
            } else {
                end.min(LONG_RAW_MAX)
            };
            Token::Raw { length }.write(&mut writer)?;
            for &byte in data[end - length..end].iter().rev() {
                writer.write_byte(byte);
            }
            end -= length;
            tokens += 1;
        }

        let (payload, initial_bits) = writer.finish();
        let checksum = XorChecksum::compute(&payload);

        tracing::trace!(
            input = data.len(),
            output = payload.len(),
            tokens,
            "encoded segment"
        );

        Ok(EncodedSegment {
            payload,
            checksum,
            initial_bits,
            decompressed_size: data.len(),
            tokens,
        })
    }
}

/// Compress `data` with the raw-token encoder.
pub fn compress(data: &[u8]) -> Result<EncodedSegment> {
    SegmentEncoder::new().encode(data)
}
