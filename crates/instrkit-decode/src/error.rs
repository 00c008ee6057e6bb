use crate::records::RecordKind;

/// Errors that can occur while decoding a reply.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A record was expected but the object is not a mapping.
    #[error("{kind} record must be a map, got {found}")]
    NotAMap {
        kind: RecordKind,
        found: &'static str,
    },

    /// A record collection was expected but the object is not a list.
    #[error("{kind} reply must be a list, got {found}")]
    NotAList {
        kind: RecordKind,
        found: &'static str,
    },

    /// The mapping does not fit the record shape (missing or mistyped field).
    #[error("invalid {kind} record: {source}")]
    Record {
        kind: RecordKind,
        source: serde_json::Error,
    },

    /// A scalar reply had an unexpected shape.
    #[error("expected {expected}, got {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
