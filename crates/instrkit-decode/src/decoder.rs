use instrkit_object::Object;
use serde::Serialize;

use crate::config::DecodeConfig;
use crate::error::{DecodeError, Result};
use crate::records::Record;
use crate::sink::DiagnosticSink;

/// A collection element that failed to decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position of the element in the raw list.
    pub index: usize,
    /// Why the element was rejected.
    pub reason: String,
    /// The raw element, when [`DecodeConfig::keep_skipped_raw`] is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Object>,
}

/// Outcome of decoding a record collection.
///
/// `records` keeps input order; every raw element ends up in exactly one of
/// `records` or `skipped`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeReport<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> DecodeReport<T> {
    /// Number of records decoded.
    pub fn kept(&self) -> usize {
        self.records.len()
    }

    /// Number of raw elements skipped.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of raw elements seen.
    pub fn total(&self) -> usize {
        self.kept() + self.skipped_count()
    }

    /// Returns true if every raw element decoded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Decode a single record. Any mismatch fails.
pub fn decode_one<T: Record>(object: &Object) -> Result<T> {
    if object.as_map().is_none() {
        return Err(DecodeError::NotAMap {
            kind: T::KIND,
            found: object.kind(),
        });
    }

    serde_json::from_value(object.to_json()).map_err(|source| DecodeError::Record {
        kind: T::KIND,
        source,
    })
}

/// Decode a list of records, skipping elements that do not decode.
///
/// Fails only when `object` itself is not a list.
pub fn decode_many<T: Record>(
    object: &Object,
    config: &DecodeConfig,
    sink: &dyn DiagnosticSink,
) -> Result<DecodeReport<T>> {
    let items = object.as_list().ok_or(DecodeError::NotAList {
        kind: T::KIND,
        found: object.kind(),
    })?;

    let mut report = DecodeReport {
        records: Vec::with_capacity(items.len()),
        skipped: Vec::new(),
    };

    for (index, item) in items.iter().enumerate() {
        match decode_one::<T>(item) {
            Ok(record) => {
                sink.record_decoded(T::KIND, item);
                report.records.push(record);
            }
            Err(err) => {
                let reason = err.to_string();
                sink.record_skipped(T::KIND, index, item, &reason);
                report.skipped.push(SkippedRecord {
                    index,
                    reason,
                    raw: config.keep_skipped_raw.then(|| item.clone()),
                });
            }
        }
    }

    Ok(report)
}
