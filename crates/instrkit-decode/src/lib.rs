//! Decoding of generic reply objects into typed records.
//!
//! Single-record replies decode all-or-nothing. Record collections decode
//! each element independently: a malformed element is skipped, reported to
//! the injected [`DiagnosticSink`], and listed in the [`DecodeReport`], while
//! the rest of the collection is still returned.

pub mod config;
pub mod decoder;
pub mod error;
pub mod records;
pub mod sink;

pub use config::DecodeConfig;
pub use decoder::{decode_many, decode_one, DecodeReport, SkippedRecord};
pub use error::{DecodeError, Result};
pub use records::{Application, DeviceInfo, Process, Record, RecordKind, StartDate};
pub use sink::{DiagnosticSink, NullSink, TracingSink};
