//! Backward bit-level I/O for DAT segment payloads.
//!
//! DAT payloads are consumed from their **last** byte toward their first.
//! Within each byte bits are taken LSB-first, but multi-bit values are
//! assembled MSB-first: the first bit read ends up as the most significant
//! bit of the result. The first byte consumed (the last byte of the payload)
//! may hold fewer than 8 valid bits; the segment header says how many.
//!
//! # Example
//!
//! ```
//! use oxidat_core::bitstream::{BitCursor, BitStreamWriter};
//! use oxidat_core::cursor::ByteCursor;
//! use oxidat_core::diagnostics::Diagnostics;
//!
//! let mut writer = BitStreamWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0xC3, 8).unwrap();
//! let (payload, initial_bits) = writer.finish();
//! assert_eq!(initial_bits, 3);
//!
//! let source = ByteCursor::new(&payload, Diagnostics::null());
//! let mut reader = BitCursor::new(&source, 0, payload.len(), initial_bits).unwrap();
//! assert_eq!(reader.read(3).unwrap(), 0b101);
//! assert_eq!(reader.read(8).unwrap(), 0xC3);
//! assert!(reader.eof());
//! ```

use crate::checksum::XorChecksum;
use crate::cursor::ByteCursor;
use crate::diagnostics::Anomaly;
use crate::error::{OxiDatError, Result};

/// Maximum number of bits a single [`BitCursor::read`] may return.
pub const MAX_READ_BITS: u32 = 32;

/// Reads bits from the end of a byte range toward its start.
///
/// Every byte pulled into the bit buffer is XORed into a running checksum
/// exactly once, however many of its bits end up being used.
#[derive(Debug)]
pub struct BitCursor<'a> {
    source: ByteCursor<'a>,
    /// Bytes `0..unread` of the window have not been pulled yet.
    unread: usize,
    buffer: u8,
    bits_in_buffer: u8,
    checksum: XorChecksum,
    bits_consumed: u64,
    exhausted: bool,
}

impl<'a> BitCursor<'a> {
    /// Create a bit cursor over `length` bytes of `source` starting at
    /// logical `start`.
    ///
    /// The last byte of the range is pulled immediately with
    /// `initial_bits` (1-8) valid bits in its low end.
    pub fn new(
        source: &ByteCursor<'a>,
        start: usize,
        length: usize,
        initial_bits: u8,
    ) -> Result<Self> {
        if !(1..=8).contains(&initial_bits) {
            return Err(OxiDatError::invalid_initial_bits(u32::from(initial_bits)));
        }
        let source = source.sub_view(start, length)?;
        Ok(Self::primed(source, initial_bits))
    }

    /// Create a bit cursor that accepts whatever a segment header declares.
    ///
    /// The range may run past the end of `source`; missing bytes read as 0
    /// and are reported by the byte cursor. An `initial_bits` of 0 leaves the
    /// primed byte with no valid bits, so the first read pulls the byte
    /// before it. Values above 8 are clamped to 8.
    pub fn tolerant(
        source: &ByteCursor<'a>,
        start: usize,
        length: usize,
        initial_bits: u8,
    ) -> Self {
        Self::primed(source.sub_view_tolerant(start, length), initial_bits.min(8))
    }

    fn primed(source: ByteCursor<'a>, initial_bits: u8) -> Self {
        let length = source.len();
        let mut cursor = Self {
            source,
            unread: length,
            buffer: 0,
            bits_in_buffer: 0,
            checksum: XorChecksum::new(),
            bits_consumed: 0,
            exhausted: false,
        };
        if length > 0 {
            cursor.pull_byte();
            cursor.bits_in_buffer = initial_bits;
        }
        cursor
    }

    /// Bring the previous byte into the bit buffer.
    fn pull_byte(&mut self) {
        self.unread -= 1;
        let byte = self.source.read_byte(Some(self.unread));
        self.checksum.update_byte(byte);
        self.buffer = byte;
        self.bits_in_buffer = 8;
    }

    /// Read `count` bits (1-32), first bit read in the most significant
    /// position.
    ///
    /// If the range runs out mid-read the missing bits are 0 and
    /// [`Anomaly::BitSourceExhausted`] is reported (once per cursor).
    pub fn read(&mut self, count: u32) -> Result<u32> {
        if count == 0 || count > MAX_READ_BITS {
            return Err(OxiDatError::invalid_bit_count(count));
        }

        let mut result = 0u32;
        for _ in 0..count {
            if self.bits_in_buffer == 0 {
                if self.unread == 0 {
                    self.report_exhausted(count);
                    result <<= 1;
                    continue;
                }
                self.pull_byte();
            }
            let bit = u32::from(self.buffer & 1);
            self.buffer >>= 1;
            self.bits_in_buffer -= 1;
            self.bits_consumed += 1;
            result = (result << 1) | bit;
        }
        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read(1)? != 0)
    }

    fn report_exhausted(&mut self, requested: u32) {
        if !self.exhausted {
            self.exhausted = true;
            self.source
                .diagnostics()
                .report(Anomaly::BitSourceExhausted { requested });
        }
    }

    /// Whether the bit buffer is empty and no earlier byte remains.
    pub fn eof(&self) -> bool {
        self.bits_in_buffer == 0 && self.unread == 0
    }

    /// XOR of every byte pulled so far.
    pub fn checksum(&self) -> u8 {
        self.checksum.value()
    }

    /// Bits handed out by [`read`](Self::read), excluding zero fill.
    pub fn bits_consumed(&self) -> u64 {
        self.bits_consumed
    }

    /// Valid bits left in the buffer plus all unpulled bytes.
    pub fn bits_remaining(&self) -> u64 {
        u64::from(self.bits_in_buffer) + self.unread as u64 * 8
    }

    /// Bytes not yet pulled into the bit buffer.
    pub fn bytes_remaining(&self) -> usize {
        self.unread
    }

    /// Whether the cursor has run dry at least once.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Collects bits in the order a [`BitCursor`] will consume them and packs
/// them into a backward payload.
#[derive(Debug, Clone, Default)]
pub struct BitStreamWriter {
    bits: Vec<bool>,
}

impl BitStreamWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    /// Append the low `count` bits of `value` (1-32), most significant first.
    pub fn write_bits(&mut self, value: u32, count: u32) -> Result<()> {
        if count == 0 || count > MAX_READ_BITS {
            return Err(OxiDatError::invalid_bit_count(count));
        }
        for i in (0..count).rev() {
            self.bits.push((value >> i) & 1 != 0);
        }
        Ok(())
    }

    /// Append a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append a full byte, most significant bit first.
    pub fn write_byte(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.bits.push((byte >> i) & 1 != 0);
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Pack the bits into bytes.
    ///
    /// Returns the payload and the number of valid bits in its last byte,
    /// which is the first byte a [`BitCursor`] consumes. An empty writer
    /// yields an empty payload and 8.
    pub fn finish(self) -> (Vec<u8>, u8) {
        let total = self.bits.len();
        if total == 0 {
            return (Vec::new(), 8);
        }

        let head = match total % 8 {
            0 => 8,
            r => r,
        };
        let byte_count = total.div_ceil(8);
        let mut payload = vec![0u8; byte_count];

        // The first `head` bits fill the last byte, the next 8 the byte
        // before it, and so on. Each byte is filled from bit 0 upward.
        let chunks = std::iter::once(&self.bits[..head]).chain(self.bits[head..].chunks(8));
        for (slot, chunk) in payload.iter_mut().rev().zip(chunks) {
            *slot = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << i));
        }

        (payload, head as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Diagnostics};

    fn cursor_over<'a>(source: &ByteCursor<'a>, initial_bits: u8) -> BitCursor<'a> {
        BitCursor::new(source, 0, source.len(), initial_bits).unwrap()
    }

    #[test]
    fn test_reads_backward_with_checksum() {
        let data = [0xAA, 0x55];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = cursor_over(&source, 8);

        assert_eq!(bits.read(8).unwrap(), 0xAA);
        assert_eq!(bits.read(8).unwrap(), 0x55);
        assert_eq!(bits.checksum(), 0xFF);
        assert!(bits.eof());
    }

    #[test]
    fn test_single_bits_are_lsb_first() {
        // 0xB5 = 0b1011_0101
        let data = [0xB5];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = cursor_over(&source, 8);

        let read: Vec<u32> = (0..8).map(|_| bits.read(1).unwrap()).collect();
        assert_eq!(read, vec![1, 0, 1, 0, 1, 1, 0, 1]);
        assert!(bits.eof());
    }

    #[test]
    fn test_initial_bits_limits_first_byte() {
        // Only the low 3 bits of the last byte are valid.
        let data = [0x00, 0b1111_1101];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = cursor_over(&source, 3);

        assert_eq!(bits.bits_remaining(), 11);
        assert_eq!(bits.read(3).unwrap(), 0b101);
        assert_eq!(bits.bytes_remaining(), 1);
        assert_eq!(bits.read(8).unwrap(), 0);
        assert!(bits.eof());
        assert_eq!(bits.checksum(), 0b1111_1101);
    }

    #[test]
    fn test_byte_pulled_once_into_checksum() {
        let data = [0x0F, 0xF0, 0x33];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = cursor_over(&source, 8);

        // Construction primes the last byte.
        assert_eq!(bits.checksum(), 0x33);
        bits.read(8).unwrap();
        assert_eq!(bits.checksum(), 0x33);
        bits.read(1).unwrap();
        assert_eq!(bits.checksum(), 0x33 ^ 0xF0);
        bits.read(7).unwrap();
        bits.read(2).unwrap();
        assert_eq!(bits.checksum(), 0x33 ^ 0xF0 ^ 0x0F);
        assert!(!bits.eof());
    }

    #[test]
    fn test_window_inside_larger_buffer() {
        let data = [0xEE, 0xAA, 0x55, 0xEE];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = BitCursor::new(&source, 1, 2, 8).unwrap();

        assert_eq!(bits.read(16).unwrap(), 0xAA55);
        assert!(bits.eof());
        assert_eq!(bits.checksum(), 0xFF);
    }

    #[test]
    fn test_invalid_bit_counts() {
        let data = [0u8; 8];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = cursor_over(&source, 8);

        assert!(matches!(
            bits.read(0),
            Err(OxiDatError::InvalidBitCount { count: 0 })
        ));
        assert!(matches!(
            bits.read(33),
            Err(OxiDatError::InvalidBitCount { count: 33 })
        ));
        assert_eq!(bits.read(32).unwrap(), 0);
    }

    #[test]
    fn test_invalid_construction() {
        let data = [0u8; 2];
        let source = ByteCursor::new(&data, Diagnostics::null());

        assert!(matches!(
            BitCursor::new(&source, 0, 2, 0),
            Err(OxiDatError::InvalidInitialBits { count: 0 })
        ));
        assert!(matches!(
            BitCursor::new(&source, 0, 2, 9),
            Err(OxiDatError::InvalidInitialBits { count: 9 })
        ));
        assert!(matches!(
            BitCursor::new(&source, 1, 2, 8),
            Err(OxiDatError::WindowOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_empty_range_is_eof() {
        let data: [u8; 0] = [];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let bits = cursor_over(&source, 8);
        assert!(bits.eof());
        assert_eq!(bits.checksum(), 0);
    }

    #[test]
    fn test_tolerant_zero_initial_bits_skips_primed_byte() {
        // The trailing 0xEE is primed but holds no valid bits.
        let data = [0xAA, 0x55, 0xEE];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = BitCursor::tolerant(&source, 0, 3, 0);

        assert_eq!(bits.checksum(), 0xEE);
        assert_eq!(bits.read(16).unwrap(), 0xAA55);
        assert!(bits.eof());
        assert_eq!(bits.checksum(), 0xEE ^ 0xFF);
    }

    #[test]
    fn test_tolerant_clamps_initial_bits() {
        let data = [0xAA, 0x55];
        let source = ByteCursor::new(&data, Diagnostics::null());
        let mut bits = BitCursor::tolerant(&source, 0, 2, 200);

        assert_eq!(bits.bits_remaining(), 16);
        assert_eq!(bits.read(16).unwrap(), 0xAA55);
        assert!(bits.eof());
    }

    #[test]
    fn test_tolerant_range_past_end_reads_zero() {
        let sink = CollectingSink::new();
        let data = [0xAA, 0x55];
        let source = ByteCursor::new(&data, Diagnostics::new(&sink, "seg"));
        // Window of 3 bytes starting at 0: its last byte is missing.
        let mut bits = BitCursor::tolerant(&source, 0, 3, 8);

        assert_eq!(bits.read(8).unwrap(), 0);
        assert_eq!(bits.read(16).unwrap(), 0xAA55);
        assert!(bits.eof());
        assert_eq!(bits.checksum(), 0xFF);
        assert_eq!(
            sink.anomalies(),
            vec![Anomaly::ReadOutOfRange { offset: 2, len: 2 }]
        );
    }

    #[test]
    fn test_exhaustion_is_tolerated_and_reported_once() {
        let sink = CollectingSink::new();
        let data = [0xFF];
        let source = ByteCursor::new(&data, Diagnostics::new(&sink, "seg"));
        let mut bits = cursor_over(&source, 4);

        assert_eq!(bits.read(6).unwrap(), 0b1111_00);
        assert_eq!(bits.read(4).unwrap(), 0);
        assert!(bits.is_exhausted());
        assert_eq!(bits.bits_consumed(), 4);
        assert_eq!(
            sink.anomalies(),
            vec![Anomaly::BitSourceExhausted { requested: 6 }]
        );
    }

    #[test]
    fn test_writer_roundtrip() {
        let mut writer = BitStreamWriter::new();
        writer.write_bits(0, 2).unwrap();
        writer.write_bits(0b010, 3).unwrap();
        for &b in b"CBA" {
            writer.write_byte(b);
        }
        assert_eq!(writer.bit_len(), 29);

        let (payload, initial_bits) = writer.finish();
        assert_eq!(payload.len(), 4);
        assert_eq!(initial_bits, 5);

        let source = ByteCursor::new(&payload, Diagnostics::null());
        let mut bits = cursor_over(&source, initial_bits);
        assert_eq!(bits.read(2).unwrap(), 0);
        assert_eq!(bits.read(3).unwrap(), 0b010);
        assert_eq!(bits.read(8).unwrap(), u32::from(b'C'));
        assert_eq!(bits.read(8).unwrap(), u32::from(b'B'));
        assert_eq!(bits.read(8).unwrap(), u32::from(b'A'));
        assert!(bits.eof());
        assert_eq!(bits.checksum(), XorChecksum::compute(&payload));
    }

    #[test]
    fn test_writer_byte_aligned() {
        let mut writer = BitStreamWriter::with_capacity(16);
        writer.write_byte(0xAA);
        writer.write_byte(0x55);
        let (payload, initial_bits) = writer.finish();

        assert_eq!(initial_bits, 8);
        // Byte-aligned input packs back to the same bytes in the same order:
        // 0xAA lands in the last byte as 0x55 and 0x55 in the first as 0xAA.
        assert_eq!(payload, vec![0xAA, 0x55]);
    }

    #[test]
    fn test_writer_empty() {
        let (payload, initial_bits) = BitStreamWriter::new().finish();
        assert!(payload.is_empty());
        assert_eq!(initial_bits, 8);
    }

    #[test]
    fn test_writer_invalid_count() {
        let mut writer = BitStreamWriter::new();
        assert!(writer.write_bits(1, 0).is_err());
        assert!(writer.write_bits(1, 40).is_err());
        writer.write_bit(true);
        assert_eq!(writer.bit_len(), 1);
    }
}
