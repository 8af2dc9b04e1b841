//! Container configuration.

use oxidat_codec::DecodeConfig;

/// What a container does with decoded segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Decode each segment once and keep the result.
    #[default]
    Memoize,
    /// Decode on every request and hand out owned buffers.
    Fresh,
}

/// Container configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Caching of decoded segments.
    pub cache: CachePolicy,
    /// Configuration passed to the segment decoder.
    pub decode: DecodeConfig,
}

impl ContainerConfig {
    /// Memoized decoding with checksum verification.
    pub const STANDARD: Self = Self {
        cache: CachePolicy::Memoize,
        decode: DecodeConfig::STANDARD,
    };

    /// Fresh decode on every access.
    pub const FRESH: Self = Self {
        cache: CachePolicy::Fresh,
        decode: DecodeConfig::STANDARD,
    };

    /// Use a different cache policy.
    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// Use a different decoder configuration.
    pub fn with_decode(mut self, decode: DecodeConfig) -> Self {
        self.decode = decode;
        self
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
