//! Backward-filling output buffer.
//!
//! The decoder writes its output from the last byte toward the first. A
//! back-reference at write position `p` with offset `d` copies from `p + d`,
//! a byte that was written earlier in construction but sits later in the
//! final output. Read front to back, this is an ordinary LZ back-reference.

use oxidat_core::bitstream::BitCursor;
use oxidat_core::diagnostics::{Anomaly, Diagnostics};
use oxidat_core::error::Result;

/// Fixed-size buffer filled from its end.
#[derive(Debug)]
pub struct OutputAssembler<'d> {
    buffer: Vec<u8>,
    /// Next byte goes to `write_pos - 1`.
    write_pos: usize,
    diag: Diagnostics<'d>,
}

impl<'d> OutputAssembler<'d> {
    /// Allocate a zeroed buffer of `len` bytes with the write cursor at the end.
    pub fn new(len: usize, diag: Diagnostics<'d>) -> Self {
        Self {
            buffer: vec![0; len],
            write_pos: len,
            diag,
        }
    }

    /// Total size of the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer has zero size.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current write cursor. Bytes `write_pos..len` are written.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> usize {
        self.buffer.len() - self.write_pos
    }

    /// Whether the buffer is full.
    pub fn eof(&self) -> bool {
        self.write_pos == 0
    }

    /// The whole buffer, including not-yet-written (zero) bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the assembler and return the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Clamp a copy of `n` bytes to the space left, reporting any overrun.
    fn clamp(&self, n: usize) -> usize {
        if n > self.write_pos {
            self.diag.report(Anomaly::OutputOverrun {
                requested: n,
                available: self.write_pos,
            });
            self.write_pos
        } else {
            n
        }
    }

    /// Copy `n` literal bytes from the bit stream.
    ///
    /// Stops early if the bit stream runs dry. Returns the number of bytes
    /// written.
    pub fn copy_raw(&mut self, n: usize, bits: &mut BitCursor<'_>) -> Result<usize> {
        let n = self.clamp(n);
        let mut copied = 0;
        while copied < n && !bits.eof() {
            self.write_pos -= 1;
            self.buffer[self.write_pos] = bits.read(8)? as u8;
            copied += 1;
        }
        Ok(copied)
    }

    /// Read an `offset_bits`-wide offset from the bit stream, then copy `n`
    /// bytes from `offset` positions further along in the buffer.
    ///
    /// An offset reaching past the written region is clamped to the
    /// farthest written byte; with nothing written yet the copied bytes
    /// are 0. Returns the number of bytes written.
    pub fn copy_back_reference(
        &mut self,
        n: usize,
        offset_bits: u32,
        bits: &mut BitCursor<'_>,
    ) -> Result<usize> {
        let mut offset = bits.read(offset_bits)? as usize + 1;
        let n = self.clamp(n);

        let written = self.written();
        if offset > written {
            self.diag.report(Anomaly::BackReferenceOutOfRange {
                offset,
                available: written,
            });
            if written == 0 {
                self.write_pos -= n;
                self.buffer[self.write_pos..self.write_pos + n].fill(0);
                return Ok(n);
            }
            offset = written;
        }

        for _ in 0..n {
            self.write_pos -= 1;
            self.buffer[self.write_pos] = self.buffer[self.write_pos + offset];
        }
        Ok(n)
    }
}
