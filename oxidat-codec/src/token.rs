//! Token prefix code for DAT segment streams.
//!
//! Each token starts with a selector read one bit at a time. A `0` is
//! followed by one more bit, a `1` by a two-bit group:
//!
//! | Selector | Token           | Payload          | Length   | Offset bits |
//! |----------|-----------------|------------------|----------|-------------|
//! | `0 0`    | short raw       | 3 bits = len-1   | 1-8      | -           |
//! | `0 1`    | short back-ref  | -                | 2        | 8           |
//! | `1 00`   | back-ref A      | -                | 3        | 9           |
//! | `1 01`   | back-ref B      | -                | 4        | 10          |
//! | `1 10`   | back-ref C      | 8 bits = len-1   | 1-256    | 12          |
//! | `1 11`   | long raw        | 8 bits = len-9   | 9-264    | -           |
//!
//! The back-reference offset itself follows the token header and is read by
//! [`OutputAssembler::copy_back_reference`](crate::output::OutputAssembler::copy_back_reference).

use oxidat_core::bitstream::{BitCursor, BitStreamWriter};
use oxidat_core::error::{OxiDatError, Result};

/// Longest short raw token.
pub const SHORT_RAW_MAX: usize = 8;
/// Shortest long raw token.
pub const LONG_RAW_MIN: usize = 9;
/// Longest long raw token.
pub const LONG_RAW_MAX: usize = 264;
/// Longest back-ref C token.
pub const BACK_REF_MAX: usize = 256;

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Copy `length` literal bytes from the bit stream.
    Raw {
        /// Number of bytes to copy.
        length: usize,
    },
    /// Copy `length` bytes from already written output.
    BackReference {
        /// Number of bytes to copy.
        length: usize,
        /// Width of the offset field that follows the token header.
        offset_bits: u32,
    },
}

impl Token {
    /// Read one token header from the stream.
    pub fn read(bits: &mut BitCursor<'_>) -> Result<Self> {
        let token = if bits.read(1)? == 0 {
            if bits.read(1)? == 0 {
                Token::Raw {
                    length: bits.read(3)? as usize + 1,
                }
            } else {
                Token::BackReference {
                    length: 2,
                    offset_bits: 8,
                }
            }
        } else {
            match bits.read(2)? {
                0b00 => Token::BackReference {
                    length: 3,
                    offset_bits: 9,
                },
                0b01 => Token::BackReference {
                    length: 4,
                    offset_bits: 10,
                },
                0b10 => Token::BackReference {
                    length: bits.read(8)? as usize + 1,
                    offset_bits: 12,
                },
                _ => Token::Raw {
                    length: bits.read(8)? as usize + LONG_RAW_MIN,
                },
            }
        };
        Ok(token)
    }

    /// Write this token's header in the order [`Token::read`] consumes it.
    ///
    /// Fails for shapes the prefix code cannot express, such as a zero-length
    /// raw copy or a back-reference with a length/offset width pairing that
    /// no selector carries.
    pub fn write(&self, writer: &mut BitStreamWriter) -> Result<()> {
        match *self {
            Token::Raw { length } if (1..=SHORT_RAW_MAX).contains(&length) => {
                writer.write_bits(0b00, 2)?;
                writer.write_bits((length - 1) as u32, 3)
            }
            Token::Raw { length } if (LONG_RAW_MIN..=LONG_RAW_MAX).contains(&length) => {
                writer.write_bits(0b111, 3)?;
                writer.write_bits((length - LONG_RAW_MIN) as u32, 8)
            }
            Token::Raw { length } => Err(OxiDatError::invalid_token(format!(
                "raw length {length} outside 1-{LONG_RAW_MAX}"
            ))),
            Token::BackReference {
                length: 2,
                offset_bits: 8,
            } => writer.write_bits(0b01, 2),
            Token::BackReference {
                length: 3,
                offset_bits: 9,
            } => writer.write_bits(0b100, 3),
            Token::BackReference {
                length: 4,
                offset_bits: 10,
            } => writer.write_bits(0b101, 3),
            Token::BackReference {
                length,
                offset_bits: 12,
            } if (1..=BACK_REF_MAX).contains(&length) => {
                writer.write_bits(0b110, 3)?;
                writer.write_bits((length - 1) as u32, 8)
            }
            Token::BackReference {
                length,
                offset_bits,
            } => Err(OxiDatError::invalid_token(format!(
                "no selector for back-reference of {length} bytes with {offset_bits}-bit offset"
            ))),
        }
    }

    /// Number of output bytes this token produces.
    pub fn length(&self) -> usize {
        match *self {
            Token::Raw { length } | Token::BackReference { length, .. } => length,
        }
    }

    /// Whether this is a raw copy.
    pub fn is_raw(&self) -> bool {
        matches!(self, Token::Raw { .. })
    }
}
