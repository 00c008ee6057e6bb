use instrkit_object::{ChannelId, Object};
use tracing::{trace, warn};

use crate::records::RecordKind;

/// Receives decode diagnostics.
///
/// Injected into the decoder and the telemetry tap so that callers (and
/// tests) choose where diagnostics go.
pub trait DiagnosticSink: Send + Sync {
    /// A record decoded successfully.
    fn record_decoded(&self, kind: RecordKind, raw: &Object) {
        let _ = (kind, raw);
    }

    /// A record in a collection failed to decode and was skipped.
    fn record_skipped(&self, kind: RecordKind, index: usize, raw: &Object, reason: &str);

    /// A push message could not be decoded and was dropped.
    fn push_dropped(&self, channel: ChannelId, reason: &str);
}

/// Emits diagnostics as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record_decoded(&self, kind: RecordKind, raw: &Object) {
        trace!(%kind, record = %raw.to_json(), "record decoded");
    }

    fn record_skipped(&self, kind: RecordKind, index: usize, raw: &Object, reason: &str) {
        warn!(%kind, index, reason, record = %raw.to_json(), "skipping malformed record");
    }

    fn push_dropped(&self, channel: ChannelId, reason: &str) {
        warn!(%channel, reason, "dropping undecodable push message");
    }
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record_skipped(&self, _kind: RecordKind, _index: usize, _raw: &Object, _reason: &str) {}

    fn push_dropped(&self, _channel: ChannelId, _reason: &str) {}
}
