//! Error types for zoneinfo-core.
//!
//! Construction of a zone is the only fallible step in this library.
//! Fresh parses of compiled data fail with [`ZoneError::MalformedZoneData`],
//! reconstruction from a persisted legacy record fails with
//! [`ZoneError::LegacyFormat`]. Lookups on a built zone never fail.

use std::fmt;

use thiserror::Error;

/// The main error type for zone construction.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// Structural violation while decoding compiled zone data.
    #[error("Malformed zone data for '{zone}': {reason}")]
    MalformedZoneData {
        zone: String,
        reason: MalformedReason,
    },

    /// Structural violation while reconstructing a persisted legacy record.
    #[error("Legacy format error at stage {stage}: {message}")]
    LegacyFormat { stage: LegacyStage, message: String },

    /// The zone data provider has no data for the requested identifier.
    #[error("Unknown time zone: {0}")]
    NotFound(String),

    /// The zone data provider failed to read the underlying data.
    #[error("I/O error reading zone '{zone}': {source}")]
    Io {
        zone: String,
        #[source]
        source: std::io::Error,
    },
}

impl ZoneError {
    pub(crate) fn malformed(zone: &str, reason: MalformedReason) -> Self {
        ZoneError::MalformedZoneData {
            zone: zone.to_string(),
            reason,
        }
    }

    pub(crate) fn legacy(stage: LegacyStage, message: impl Into<String>) -> Self {
        ZoneError::LegacyFormat {
            stage,
            message: message.into(),
        }
    }
}

/// The specific structural violation found in compiled zone data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("invalid magic bytes")]
    MagicValue,

    #[error("unsupported version byte {0:#04x}")]
    Version(u8),

    #[error("buffer truncated while reading {0}")]
    Truncated(&'static str),

    #[error("zone data declares no offset types")]
    NoTypes,

    #[error("transition {index} refers to type {type_index}, but only {type_count} types exist")]
    TypeIndexOutOfRange {
        index: usize,
        type_index: usize,
        type_count: usize,
    },

    #[error("transition {index} at {instant} does not follow {previous}")]
    UnsortedTransitions {
        index: usize,
        instant: i64,
        previous: i64,
    },

    #[error("type {index} has invalid DST flag {flag}")]
    InvalidDstFlag { index: usize, flag: u8 },

    #[error("type {index} has offset {offset} outside of -25:59:59..=+25:59:59")]
    OffsetOutOfRange { index: usize, offset: i32 },

    #[error("too many offset types ({0})")]
    TooManyTypes(usize),
}

/// Stages of legacy record reconstruction.
///
/// A failure reports the stage that could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStage {
    RawBytesLoaded,
    FieldsExtracted,
    TableReconstructed,
    Reconciled,
}

impl fmt::Display for LegacyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyStage::RawBytesLoaded => write!(f, "raw_bytes_loaded"),
            LegacyStage::FieldsExtracted => write!(f, "fields_extracted"),
            LegacyStage::TableReconstructed => write!(f, "table_reconstructed"),
            LegacyStage::Reconciled => write!(f, "reconciled"),
        }
    }
}

/// Result type alias for zone operations.
pub type Result<T> = std::result::Result<T, ZoneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_names_zone_and_reason() {
        let err = ZoneError::malformed(
            "Test/Zone",
            MalformedReason::TypeIndexOutOfRange {
                index: 3,
                type_index: 7,
                type_count: 2,
            },
        );
        assert_eq!(
            err.to_string(),
            "Malformed zone data for 'Test/Zone': transition 3 refers to type 7, but only 2 types exist"
        );
    }

    #[test]
    fn legacy_display_names_stage() {
        let err = ZoneError::legacy(LegacyStage::FieldsExtracted, "missing field `id`");
        assert_eq!(
            err.to_string(),
            "Legacy format error at stage fields_extracted: missing field `id`"
        );
    }
}
