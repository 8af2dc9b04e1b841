//! Windowed byte cursor over a borrowed buffer.
//!
//! A [`ByteCursor`] views a window of a backing slice: logical offset 0 maps
//! to `hidden_offset` in the backing store. Sub-views share the same slice,
//! which is how a container hands a segment's payload to the bit decoder
//! without copying the archive.
//!
//! Reads never fail on bad data. A read that falls outside the backing store
//! yields 0 (or a shortened string) and reports
//! [`Anomaly::ReadOutOfRange`] to the attached diagnostics.
//!
//! ```
//! use oxidat_core::cursor::ByteCursor;
//! use oxidat_core::diagnostics::Diagnostics;
//!
//! let data = [0x00, 0x12, 0x34, 0x56];
//! let mut cursor = ByteCursor::new(&data, Diagnostics::null());
//! assert_eq!(cursor.read_word_be(Some(1)), 0x1234);
//! assert_eq!(cursor.read_byte(None), 0x56);
//! assert!(cursor.eof());
//! ```

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::error::{OxiDatError, Result};

/// Random-access byte view with a logical window and a moving cursor.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    hidden_offset: usize,
    length: usize,
    /// Logical position, relative to `hidden_offset`.
    pos: usize,
    diag: Diagnostics<'a>,
}

impl<'a> ByteCursor<'a> {
    /// View the whole of `data`.
    pub fn new(data: &'a [u8], diag: Diagnostics<'a>) -> Self {
        Self {
            data,
            hidden_offset: 0,
            length: data.len(),
            pos: 0,
            diag,
        }
    }

    /// View `length` bytes of `data` starting at absolute `offset`.
    pub fn with_window(
        data: &'a [u8],
        offset: usize,
        length: usize,
        diag: Diagnostics<'a>,
    ) -> Result<Self> {
        check_window(offset, length, data.len())?;
        Ok(Self {
            data,
            hidden_offset: offset,
            length,
            pos: 0,
            diag,
        })
    }

    /// A new cursor over `length` bytes starting at logical `offset` of this
    /// view, sharing the backing store.
    pub fn sub_view(&self, offset: usize, length: usize) -> Result<ByteCursor<'a>> {
        let start = self
            .hidden_offset
            .checked_add(offset)
            .ok_or_else(|| OxiDatError::window_out_of_bounds(offset, length, self.data.len()))?;
        check_window(start, length, self.data.len())?;
        Ok(self.sub_view_unchecked_bounds(start, length))
    }

    /// Like [`sub_view`](Self::sub_view), but the window may extend past the
    /// backing store. Bytes outside it read as 0 and are reported.
    pub fn sub_view_tolerant(&self, offset: usize, length: usize) -> ByteCursor<'a> {
        self.sub_view_unchecked_bounds(self.hidden_offset.saturating_add(offset), length)
    }

    fn sub_view_unchecked_bounds(&self, start: usize, length: usize) -> ByteCursor<'a> {
        Self {
            data: self.data,
            hidden_offset: start,
            length,
            pos: 0,
            diag: self.diag,
        }
    }

    /// Logical length of the window.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Absolute offset of logical 0 in the backing store.
    pub fn hidden_offset(&self) -> usize {
        self.hidden_offset
    }

    /// The bytes of the logical window that exist in the backing store.
    pub fn as_slice(&self) -> &'a [u8] {
        let end = self
            .hidden_offset
            .saturating_add(self.length)
            .min(self.data.len());
        let start = self.hidden_offset.min(end);
        &self.data[start..end]
    }

    /// Diagnostics attached to this cursor.
    pub fn diagnostics(&self) -> Diagnostics<'a> {
        self.diag
    }

    /// Current logical position.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Move to logical position `offset`.
    pub fn set_offset(&mut self, offset: usize) {
        self.pos = offset;
    }

    /// Bytes between the cursor and the end of the window.
    pub fn remaining(&self) -> usize {
        self.length.saturating_sub(self.pos)
    }

    /// Whether the cursor is at or past the end of the window.
    pub fn eof(&self) -> bool {
        self.pos >= self.length
    }

    /// Read one byte, first moving to `offset` if given.
    pub fn read_byte(&mut self, offset: Option<usize>) -> u8 {
        if let Some(offset) = offset {
            self.pos = offset;
        }
        let abs = self.hidden_offset.checked_add(self.pos);
        self.pos = self.pos.saturating_add(1);
        match abs.and_then(|abs| self.data.get(abs)) {
            Some(&b) => b,
            None => {
                self.diag.report(Anomaly::ReadOutOfRange {
                    offset: report_offset(abs),
                    len: self.data.len(),
                });
                0
            }
        }
    }

    /// Read a big-endian 16-bit word.
    pub fn read_word_be(&mut self, offset: Option<usize>) -> u16 {
        let hi = self.read_byte(offset);
        let lo = self.read_byte(None);
        u16::from_be_bytes([hi, lo])
    }

    /// Read a little-endian 16-bit word.
    pub fn read_word_le(&mut self, offset: Option<usize>) -> u16 {
        let lo = self.read_byte(offset);
        let hi = self.read_byte(None);
        u16::from_le_bytes([lo, hi])
    }

    /// Read a big-endian unsigned integer of `width` bytes (1-4).
    pub fn read_int_be(&mut self, width: usize, offset: Option<usize>) -> Result<u32> {
        check_int_width(width)?;
        let mut value = u32::from(self.read_byte(offset));
        for _ in 1..width {
            value = (value << 8) | u32::from(self.read_byte(None));
        }
        Ok(value)
    }

    /// Read a little-endian unsigned integer of `width` bytes (1-4).
    pub fn read_int_le(&mut self, width: usize, offset: Option<usize>) -> Result<u32> {
        check_int_width(width)?;
        let mut value = u32::from(self.read_byte(offset));
        for i in 1..width {
            value |= u32::from(self.read_byte(None)) << (8 * i);
        }
        Ok(value)
    }

    /// Read a fixed-length string of single-byte characters.
    ///
    /// Bytes map one-to-one onto chars (Latin-1). If the backing store ends
    /// early the string is truncated; the cursor still advances by `len`.
    pub fn read_string(&mut self, len: usize, offset: Option<usize>) -> String {
        if let Some(offset) = offset {
            self.pos = offset;
        }
        let abs = self.hidden_offset.checked_add(self.pos);
        self.pos = self.pos.saturating_add(len);

        let available = abs.map_or(0, |abs| self.data.len().saturating_sub(abs).min(len));
        if available < len {
            self.diag.report(Anomaly::StringTruncated {
                offset: report_offset(abs),
                requested: len,
                available,
            });
        }
        let Some(abs) = abs.filter(|_| available > 0) else {
            return String::new();
        };
        self.data[abs..abs + available]
            .iter()
            .map(|&b| char::from(b))
            .collect()
    }
}

/// Absolute offset as carried by anomalies; `None` means it overflowed.
fn report_offset(abs: Option<usize>) -> i64 {
    abs.and_then(|abs| i64::try_from(abs).ok())
        .unwrap_or(i64::MAX)
}

fn check_window(offset: usize, length: usize, available: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= available => Ok(()),
        _ => Err(OxiDatError::window_out_of_bounds(offset, length, available)),
    }
}

fn check_int_width(width: usize) -> Result<()> {
    if (1..=4).contains(&width) {
        Ok(())
    } else {
        Err(OxiDatError::invalid_int_width(width))
    }
}
