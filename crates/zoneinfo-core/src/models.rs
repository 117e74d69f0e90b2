//! Core data types for zoneinfo.
//!
//! This module defines the primary types used throughout the library:
//! - [`OffsetType`] - A UTC offset together with its DST flag
//! - [`Transition`] - An instant at which a zone switches to an offset type
//! - [`ZoneSummary`] - Zone-wide facts, as reported by the CLI
//! - [`OffsetLookup`] - The answer to a single point-in-time query

use std::fmt;

use serde::Serialize;

/// A UTC offset "type" shared by one or more transitions.
///
/// `utc_offset` is the total offset from UTC in seconds, i.e. it already
/// includes the DST delta when `is_dst` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OffsetType {
    /// Total offset from UTC in seconds.
    pub utc_offset: i32,
    /// Whether this type denotes daylight saving time.
    pub is_dst: bool,
}

impl OffsetType {
    /// A standard (non-DST) type with the given offset.
    pub const fn standard(utc_offset: i32) -> Self {
        OffsetType {
            utc_offset,
            is_dst: false,
        }
    }

    /// A daylight saving type with the given total offset.
    pub const fn daylight(utc_offset: i32) -> Self {
        OffsetType {
            utc_offset,
            is_dst: true,
        }
    }
}

impl fmt::Display for OffsetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_offset(self.utc_offset))?;
        if self.is_dst {
            write!(f, " (dst)")?;
        }
        Ok(())
    }
}

/// A point in time at which the zone's offset changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Seconds since the Unix epoch.
    pub instant: i64,
    /// Index into the owning table's type list.
    pub type_index: u8,
}

/// Zone-wide facts about a constructed zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSummary {
    /// The zone identifier (e.g. `Europe/Berlin`).
    pub id: String,
    /// Raw (standard) offset in seconds.
    pub raw_offset_seconds: i32,
    /// Whether the zone defines any DST offset type.
    pub uses_daylight_time: bool,
    /// DST delta in seconds, `0` when the zone has no DST.
    pub dst_savings_seconds: i32,
    /// Number of compiled transitions.
    pub transition_count: usize,
    /// First compiled transition instant, if any.
    pub first_transition: Option<i64>,
    /// Last compiled transition instant, if any.
    pub last_transition: Option<i64>,
    /// The distinct offset types of the zone.
    pub types: Vec<OffsetType>,
}

/// The offset in effect at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetLookup {
    /// The queried instant in seconds since the epoch.
    pub instant: i64,
    /// The zone identifier.
    pub zone: String,
    /// Total UTC offset in seconds.
    pub utc_offset_seconds: i32,
    /// The same offset formatted as `+HH:MM` (or `+HH:MM:SS`).
    pub utc_offset: String,
    /// Whether daylight saving time is in effect.
    pub is_dst: bool,
}

/// Format an offset in seconds as `+HH:MM`, appending `:SS` when needed.
///
/// # Examples
///
/// ```
/// use zoneinfo_core::models::format_offset;
///
/// assert_eq!(format_offset(3600), "+01:00");
/// assert_eq!(format_offset(-1800), "-00:30");
/// assert_eq!(format_offset(1050), "+00:17:30");
/// ```
pub fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let (hours, minutes, secs) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if secs == 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_offset_zero_is_positive() {
        assert_eq!(format_offset(0), "+00:00");
    }

    #[test]
    fn format_offset_large_values() {
        assert_eq!(format_offset(13 * 3600), "+13:00");
        assert_eq!(format_offset(-(9 * 3600 + 30 * 60)), "-09:30");
    }

    #[test]
    fn offset_type_display() {
        assert_eq!(OffsetType::standard(3600).to_string(), "+01:00");
        assert_eq!(OffsetType::daylight(7200).to_string(), "+02:00 (dst)");
    }

    #[test]
    fn offset_type_serialization() {
        assert_eq!(
            serde_json::to_string(&OffsetType::daylight(5400)).unwrap(),
            r#"{"utc_offset":5400,"is_dst":true}"#
        );
    }

    #[test]
    fn lookup_serialization_field_order() {
        let lookup = OffsetLookup {
            instant: 0,
            zone: "Test/Zone".to_string(),
            utc_offset_seconds: -1800,
            utc_offset: format_offset(-1800),
            is_dst: false,
        };
        assert_eq!(
            serde_json::to_string(&lookup).unwrap(),
            r#"{"instant":0,"zone":"Test/Zone","utc_offset_seconds":-1800,"utc_offset":"-00:30","is_dst":false}"#
        );
    }
}
