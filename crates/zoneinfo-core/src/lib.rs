//! # zoneinfo-core
//!
//! A time-zone transition engine for compiled zone data.
//!
//! This library decodes compiled (TZif) zone files into immutable transition
//! tables and answers point-in-time offset queries, plus the zone-wide
//! daylight-saving facts legacy time-zone APIs expose.
//!
//! ## Features
//!
//! - **Binary Search Lookup**: The offset at any instant is found by a binary
//!   search over sorted transition instants.
//! - **Pre-history Policy**: Instants before the first transition use the
//!   zone's earliest standard type, never a DST type when a standard one exists.
//! - **Consistent DST Facts**: `use_daylight_time()` and
//!   `dst_savings_seconds() != 0` always agree, whichever way a zone was built.
//! - **Legacy Records**: Persisted zones from older versions are reconciled
//!   to the answers a fresh parse would give.
//! - **Shared Zones**: Zones are immutable and cached per identifier behind
//!   an `Arc`.
//!
//! ## Example
//!
//! ```rust
//! use zoneinfo_core::prelude::*;
//!
//! // Compile a zone with one summer-time period
//! let bytes = TzifBuilder::new()
//!     .offset_type(OffsetType::standard(3600))
//!     .offset_type(OffsetType::daylight(7200))
//!     .transition(1_774_746_000, 1)
//!     .transition(1_792_890_000, 0)
//!     .build();
//!
//! let cache = ZoneCache::new(MemoryProvider::new().with_zone("Test/Berlin", bytes));
//! let zone = cache.get("Test/Berlin").unwrap();
//!
//! assert_eq!(zone.offset_seconds_at(1_780_000_000), 7200);
//! assert!(zone.use_daylight_time());
//! assert_eq!(zone.dst_savings_seconds(), 3600);
//! ```

pub mod error;
pub mod legacy;
pub mod models;
pub mod provider;
pub mod table;
pub mod tzif;
pub mod zone;

// Re-export commonly used types at the crate root
pub use error::{LegacyStage, MalformedReason, Result, ZoneError};
pub use models::{OffsetLookup, OffsetType, Transition, ZoneSummary};
pub use provider::{DirectoryProvider, MemoryProvider, ZoneCache, ZoneDataProvider};
pub use table::TransitionTable;
pub use zone::{Era, ZoneInfo};

/// Prelude module for convenient imports.
///
/// ```
/// use zoneinfo_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{LegacyStage, Result, ZoneError};
    pub use crate::legacy::{LegacyRecord, decode as decode_legacy, encode as encode_legacy};
    pub use crate::models::*;
    pub use crate::provider::{DirectoryProvider, MemoryProvider, ZoneCache, ZoneDataProvider};
    pub use crate::table::TransitionTable;
    pub use crate::tzif::{TzifBuilder, TzifVersion};
    pub use crate::zone::{Era, ZoneInfo};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tzif::TzifBuilder;

    fn new_york_like() -> Vec<u8> {
        TzifBuilder::from_parts(
            &[
                (1_710_054_000, 1),
                (1_730_613_600, 0),
                (1_741_503_600, 1),
                (1_762_063_200, 0),
            ],
            &[OffsetType::standard(-18_000), OffsetType::daylight(-14_400)],
        )
        .build()
    }

    #[test]
    fn full_workflow_through_cache() {
        let cache = ZoneCache::new(MemoryProvider::new().with_zone("Test/NewYork", new_york_like()));
        let zone = cache.get("Test/NewYork").unwrap();

        // 2024-07-01T00:00:00Z is summer time
        let lookup = zone.lookup(1_719_792_000);
        assert_eq!(lookup.utc_offset_seconds, -14_400);
        assert_eq!(lookup.utc_offset, "-04:00");
        assert!(lookup.is_dst);

        // 2024-01-01T00:00:00Z precedes all transitions
        assert_eq!(zone.offset_seconds_at(1_704_067_200), -18_000);
        assert_eq!(zone.raw_offset_seconds(), -18_000);
        assert_eq!(zone.dst_savings_seconds(), 3600);
    }

    #[test]
    fn legacy_round_trip_preserves_rules() {
        let zone = ZoneInfo::from_tzif("Test/NewYork", &new_york_like()).unwrap();
        let restored = legacy::decode(&legacy::encode(&zone).unwrap()).unwrap();
        assert_eq!(restored, zone);
    }

    #[test]
    fn prelude_exports() {
        use crate::prelude::*;

        let zone = ZoneInfo::fixed("Fixed/UTC", 0).unwrap();
        let _record: LegacyRecord = LegacyRecord::from_zone(&zone).unwrap();
        let _bytes = encode_legacy(&zone).unwrap();
        let _version = TzifVersion::V1;
        let _stage = LegacyStage::Reconciled;
    }
}
