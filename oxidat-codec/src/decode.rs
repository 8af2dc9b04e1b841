//! Segment decompression.
//!
//! The decoder runs a single loop: read a [`Token`], apply it to the
//! [`OutputAssembler`], repeat until the output is full or the bit stream is
//! exhausted. A well-formed stream hits both at once. Afterwards the running
//! checksum is compared with the declared one; a mismatch is reported but
//! the decoded bytes are still returned.

use crate::config::DecodeConfig;
use crate::output::OutputAssembler;
use crate::token::Token;
use oxidat_core::bitstream::BitCursor;
use oxidat_core::cursor::ByteCursor;
use oxidat_core::diagnostics::{Anomaly, Diagnostics, TracingSink};
use oxidat_core::error::Result;

/// Header fields the decoder needs for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentParams {
    /// Valid bits in the first consumed (last) payload byte, 1-8.
    pub initial_bits: u8,
    /// Declared XOR checksum of the payload.
    pub checksum: u8,
    /// Size of the decompressed output.
    pub decompressed_size: usize,
}

/// Result of decoding one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSegment {
    /// Decompressed bytes, exactly `decompressed_size` long.
    pub data: Vec<u8>,
    /// Running checksum accumulated while decoding.
    pub checksum: u8,
    /// Whether `checksum` equals the declared value.
    pub checksum_matches: bool,
    /// Number of tokens interpreted.
    pub tokens: usize,
    /// Payload bits left unread when decoding stopped.
    pub bits_unused: u64,
}

/// Token interpreter for DAT segment payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentDecoder {
    config: DecodeConfig,
}

impl SegmentDecoder {
    /// Create a decoder with the given configuration.
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Decoder configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode the `payload_len`-byte payload at logical `start` of `source`.
    ///
    /// Header values are taken as found: a payload running past the end of
    /// `source` reads as zero bytes, and `initial_bits` outside 1-8 is
    /// handled as described on [`BitCursor::tolerant`]. Anomalies go to the
    /// diagnostics attached to `source`.
    pub fn decode(
        &self,
        source: &ByteCursor<'_>,
        start: usize,
        payload_len: usize,
        params: &SegmentParams,
    ) -> Result<DecodedSegment> {
        let diag = source.diagnostics();
        let mut bits = BitCursor::tolerant(source, start, payload_len, params.initial_bits);
        let mut output = OutputAssembler::new(params.decompressed_size, diag);

        let mut tokens = 0usize;
        while !output.eof() && !bits.eof() {
            match Token::read(&mut bits)? {
                Token::Raw { length } => {
                    output.copy_raw(length, &mut bits)?;
                }
                Token::BackReference {
                    length,
                    offset_bits,
                } => {
                    output.copy_back_reference(length, offset_bits, &mut bits)?;
                }
            }
            tokens += 1;
        }

        if !output.eof() {
            diag.report(Anomaly::OutputIncomplete {
                written: output.written(),
                expected: output.len(),
            });
        }

        let checksum = bits.checksum();
        let checksum_matches = checksum == params.checksum;
        if self.config.verify_checksum && !checksum_matches {
            diag.report(Anomaly::ChecksumMismatch {
                expected: params.checksum,
                computed: checksum,
            });
        }

        tracing::debug!(
            source = diag.source(),
            compressed = payload_len,
            decompressed = params.decompressed_size,
            tokens,
            "decoded segment"
        );

        Ok(DecodedSegment {
            data: output.into_inner(),
            checksum,
            checksum_matches,
            tokens,
            bits_unused: bits.bits_remaining(),
        })
    }

    /// Decode a standalone payload slice.
    pub fn decode_slice(
        &self,
        payload: &[u8],
        params: &SegmentParams,
        diag: Diagnostics<'_>,
    ) -> Result<DecodedSegment> {
        let source = ByteCursor::new(payload, diag);
        self.decode(&source, 0, payload.len(), params)
    }
}

/// Decompress a segment payload, reporting anomalies through `tracing`.
pub fn decompress(payload: &[u8], params: &SegmentParams) -> Result<Vec<u8>> {
    let diag = Diagnostics::new(&TracingSink, "segment");
    SegmentDecoder::default()
        .decode_slice(payload, params, diag)
        .map(|decoded| decoded.data)
}
