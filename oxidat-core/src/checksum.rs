//! XOR-fold checksum used by DAT segment headers.
//!
//! Each segment header declares one byte: the XOR of every byte in the
//! compressed payload. The decoder folds bytes in as it pulls them from the
//! bit stream, so a fully consumed stream yields the same value as
//! [`XorChecksum::compute`] over the payload.

/// Running 8-bit XOR checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XorChecksum {
    value: u8,
}

impl XorChecksum {
    /// Create a new checksum with value 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to 0.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Fold in a single byte.
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        self.value ^= byte;
    }

    /// Fold in a slice.
    pub fn update(&mut self, data: &[u8]) {
        self.value = data.iter().fold(self.value, |acc, &b| acc ^ b);
    }

    /// Current value.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Finalize and return the checksum.
    pub fn finalize(self) -> u8 {
        self.value
    }

    /// Compute the checksum of `data` in one call.
    pub fn compute(data: &[u8]) -> u8 {
        let mut sum = Self::new();
        sum.update(data);
        sum.finalize()
    }
}
