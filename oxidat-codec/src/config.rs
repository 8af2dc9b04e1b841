//! Segment decoder configuration.

/// Decoder configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Whether to compare the running checksum against the declared one and
    /// report a mismatch. The decoded bytes are returned either way.
    pub verify_checksum: bool,
}

impl DecodeConfig {
    /// Standard configuration: checksum verified, mismatches reported.
    pub const STANDARD: Self = Self {
        verify_checksum: true,
    };

    /// Skip checksum verification entirely.
    ///
    /// Useful for archives known to carry bad checksums, where the
    /// mismatch reports would only be noise.
    pub const UNCHECKED: Self = Self {
        verify_checksum: false,
    };
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
