//! Non-fatal diagnostics for tolerated data anomalies.
//!
//! DAT archives in the wild carry truncated tails, checksum quirks and the
//! odd malformed header. None of these abort decoding: the codec falls back
//! to a defined value, reports an [`Anomaly`] to a [`DiagnosticSink`], and
//! carries on. The default sink forwards to `tracing`.
//!
//! # Example
//!
//! ```
//! use oxidat_core::diagnostics::{Anomaly, CollectingSink, Diagnostics};
//!
//! let sink = CollectingSink::new();
//! let diag = Diagnostics::new(&sink, "LEVEL000.DAT");
//! diag.report(Anomaly::ChecksumMismatch { expected: 0x12, computed: 0x34 });
//!
//! assert_eq!(sink.len(), 1);
//! assert!(sink.contains(|a| matches!(a, Anomaly::ChecksumMismatch { .. })));
//! ```

use std::sync::Mutex;
use thiserror::Error;

/// A tolerated anomaly in archive data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    /// A byte read fell outside the backing buffer; 0 was returned.
    #[error("read out of range at absolute offset {offset} (buffer is {len} bytes)")]
    ReadOutOfRange {
        /// Absolute offset that was requested.
        offset: i64,
        /// Size of the backing buffer.
        len: usize,
    },

    /// A string read ran past the end of the buffer and was truncated.
    #[error("string at offset {offset} truncated to {available} of {requested} bytes")]
    StringTruncated {
        /// Absolute offset of the string.
        offset: i64,
        /// Requested length.
        requested: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// The bit source ran out of bytes; missing bits read as 0.
    #[error("bit source exhausted while reading {requested} bits")]
    BitSourceExhausted {
        /// Bits requested by the read that ran dry.
        requested: u32,
    },

    /// A copy would write before the start of the output buffer.
    #[error("output overrun: copy of {requested} bytes clamped to {available}")]
    OutputOverrun {
        /// Bytes the token asked for.
        requested: usize,
        /// Space left in the output buffer.
        available: usize,
    },

    /// Decoding stopped before the output buffer was full.
    #[error("output incomplete: {written} of {expected} bytes decoded")]
    OutputIncomplete {
        /// Bytes actually decoded.
        written: usize,
        /// Declared decompressed size.
        expected: usize,
    },

    /// A back-reference points past the already written output.
    #[error("back-reference offset {offset} out of range (only {available} bytes written)")]
    BackReferenceOutOfRange {
        /// Offset decoded from the stream.
        offset: usize,
        /// Bytes written so far.
        available: usize,
    },

    /// The running checksum does not match the declared one.
    #[error("checksum mismatch: expected {expected:#04x}, computed {computed:#04x}")]
    ChecksumMismatch {
        /// Checksum declared in the segment header.
        expected: u8,
        /// Checksum accumulated while decoding.
        computed: u8,
    },

    /// A segment header failed validation; scanning stopped.
    #[error("malformed segment header at offset {offset}: {message}")]
    MalformedHeader {
        /// Absolute offset of the header.
        offset: usize,
        /// What was wrong with it.
        message: String,
    },

    /// Bytes after the last segment too short to hold a header.
    #[error("{count} trailing bytes at offset {offset} ignored")]
    TrailingBytes {
        /// Absolute offset of the trailing bytes.
        offset: usize,
        /// Number of trailing bytes.
        count: usize,
    },
}

/// Receiver of tolerated anomalies.
///
/// `source` is the human-readable name of whatever is being decoded,
/// usually the archive file name with a segment suffix.
pub trait DiagnosticSink: Send + Sync {
    /// Record one anomaly.
    fn report(&self, source: &str, anomaly: &Anomaly);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str, &Anomaly) + Send + Sync,
{
    fn report(&self, source: &str, anomaly: &Anomaly) {
        self(source, anomaly)
    }
}

/// Sink that forwards every anomaly to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, source: &str, anomaly: &Anomaly) {
        tracing::warn!(source, "{}", anomaly);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _source: &str, _anomaly: &Anomaly) {}
}

/// Sink that keeps every anomaly for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<(String, Anomaly)>>,
}

impl CollectingSink {
    /// Create an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of anomalies recorded.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all recorded anomalies with their sources.
    pub fn entries(&self) -> Vec<(String, Anomaly)> {
        self.lock().clone()
    }

    /// Snapshot of all recorded anomalies.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.lock().iter().map(|(_, a)| a.clone()).collect()
    }

    /// Whether any recorded anomaly satisfies `pred`.
    pub fn contains(&self, pred: impl Fn(&Anomaly) -> bool) -> bool {
        self.lock().iter().any(|(_, a)| pred(a))
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, Anomaly)>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, source: &str, anomaly: &Anomaly) {
        self.lock().push((source.to_owned(), anomaly.clone()));
    }
}

/// A sink paired with the name of the thing being decoded.
#[derive(Clone, Copy)]
pub struct Diagnostics<'a> {
    sink: &'a dyn DiagnosticSink,
    source: &'a str,
}

impl<'a> Diagnostics<'a> {
    /// Pair `sink` with a source name.
    pub fn new(sink: &'a dyn DiagnosticSink, source: &'a str) -> Self {
        Self { sink, source }
    }

    /// Diagnostics that go nowhere.
    pub fn null() -> Diagnostics<'static> {
        Diagnostics {
            sink: &NullSink,
            source: "",
        }
    }

    /// Source name attached to every report.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Report one anomaly.
    pub fn report(&self, anomaly: Anomaly) {
        self.sink.report(self.source, &anomaly);
    }
}

impl std::fmt::Debug for Diagnostics<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        let diag = Diagnostics::new(&sink, "MAIN.DAT#2");
        diag.report(Anomaly::TrailingBytes { offset: 40, count: 3 });

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "MAIN.DAT#2");
        assert_eq!(entries[0].1, Anomaly::TrailingBytes { offset: 40, count: 3 });

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let hits = AtomicUsize::new(0);
        let sink = |_: &str, _: &Anomaly| {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let diag = Diagnostics::new(&sink, "x");
        diag.report(Anomaly::BitSourceExhausted { requested: 8 });
        diag.report(Anomaly::BitSourceExhausted { requested: 3 });
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_null_and_tracing_sinks_accept_reports() {
        Diagnostics::null().report(Anomaly::ReadOutOfRange { offset: -1, len: 0 });
        Diagnostics::new(&TracingSink, "t").report(Anomaly::ChecksumMismatch {
            expected: 1,
            computed: 2,
        });
    }

    #[test]
    fn test_anomaly_display() {
        let a = Anomaly::ChecksumMismatch {
            expected: 0x0F,
            computed: 0xF0,
        };
        assert_eq!(a.to_string(), "checksum mismatch: expected 0x0f, computed 0xf0");

        let a = Anomaly::MalformedHeader {
            offset: 0,
            message: "segment size 4 below header size".into(),
        };
        assert!(a.to_string().contains("offset 0"));
    }
}
