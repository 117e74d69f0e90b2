//! The zone engine: point-in-time offsets and zone-wide DST facts.
//!
//! A [`ZoneInfo`] is built once, either from compiled zone data or from a
//! legacy record (see [`crate::legacy`]), and is immutable afterwards.
//! Both zone-wide DST answers are derived from the transition table at
//! construction, so `use_daylight_time()` and `dst_savings_seconds() != 0`
//! always agree.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::error::{Result, ZoneError};
use crate::models::{OffsetLookup, OffsetType, ZoneSummary, format_offset};
use crate::table::TransitionTable;
use crate::tzif;

/// DST delta reported when a zone's DST type has the same offset as the
/// standard time it replaces.
pub const DEFAULT_DST_SAVINGS: i32 = 3600;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Era of a civil year, for [`ZoneInfo::offset_for_civil`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    /// Before the common era; year 1 BC is proleptic year 0.
    BC,
    /// The common era.
    AD,
}

/// A named time zone backed by a compiled transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    id: String,
    raw_offset: i32,
    table: TransitionTable,
    uses_dst: bool,
    dst_savings: i32,
}

impl ZoneInfo {
    /// Build a zone from compiled (TZif) zone data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ZoneError::MalformedZoneData`] if the data cannot be
    /// decoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use zoneinfo_core::models::OffsetType;
    /// use zoneinfo_core::tzif::TzifBuilder;
    /// use zoneinfo_core::zone::ZoneInfo;
    ///
    /// let bytes = TzifBuilder::new()
    ///     .offset_type(OffsetType::standard(3600))
    ///     .offset_type(OffsetType::daylight(7200))
    ///     .transition(0, 1)
    ///     .transition(1_000, 0)
    ///     .build();
    /// let zone = ZoneInfo::from_tzif("Test/Zone", &bytes).unwrap();
    ///
    /// assert_eq!(zone.offset_seconds_at(500), 7200);
    /// assert!(zone.use_daylight_time());
    /// assert_eq!(zone.dst_savings_seconds(), 3600);
    /// ```
    pub fn from_tzif(id: &str, bytes: &[u8]) -> Result<Self> {
        let parsed = tzif::parse(id, bytes)?;
        Ok(ZoneInfo::from_table(
            id,
            parsed.table,
            parsed.declared_raw_offset,
        ))
    }

    /// Build a zone from an already validated table.
    ///
    /// `declared_raw_offset` is used as the raw offset only when the table
    /// has no transition into a standard type.
    pub fn from_table(
        id: impl Into<String>,
        table: TransitionTable,
        declared_raw_offset: i32,
    ) -> Self {
        let raw_offset = table
            .latest_standard_offset()
            .unwrap_or(declared_raw_offset);
        let dst_savings = derive_dst_savings(&table, raw_offset);
        ZoneInfo {
            id: id.into(),
            raw_offset,
            uses_dst: dst_savings != 0,
            dst_savings,
            table,
        }
    }

    /// A zone with a single constant offset and no transitions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ZoneError::MalformedZoneData`] if `utc_offset` is
    /// outside `-25:59:59..=+25:59:59`.
    pub fn fixed(id: impl Into<String>, utc_offset: i32) -> Result<Self> {
        let id = id.into();
        let table =
            TransitionTable::new(std::iter::empty(), &[OffsetType::standard(utc_offset)])
                .map_err(|reason| ZoneError::malformed(&id, reason))?;
        Ok(ZoneInfo::from_table(id, table, utc_offset))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The standard offset used when no transition applies.
    pub fn raw_offset_seconds(&self) -> i32 {
        self.raw_offset
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// The offset type in effect at `instant` (seconds since the epoch).
    pub fn offset_type_at(&self, instant: i64) -> OffsetType {
        self.table
            .offset_type_at(instant)
            .unwrap_or(OffsetType::standard(self.raw_offset))
    }

    /// Total UTC offset in seconds in effect at `instant`.
    pub fn offset_seconds_at(&self, instant: i64) -> i32 {
        self.offset_type_at(instant).utc_offset
    }

    /// Whether daylight saving time is in effect at `instant`.
    pub fn is_daylight_time_at(&self, instant: i64) -> bool {
        self.offset_type_at(instant).is_dst
    }

    /// Whether the zone defines any DST offset type at all.
    ///
    /// This does not depend on the current time: a zone that observed DST
    /// only historically still reports `true`.
    pub fn use_daylight_time(&self) -> bool {
        self.uses_dst
    }

    /// The zone's DST delta in seconds, `0` exactly when the zone has no DST.
    pub fn dst_savings_seconds(&self) -> i32 {
        self.dst_savings
    }

    /// Total UTC offset in milliseconds at `epoch_millis`.
    pub fn offset_millis_at(&self, epoch_millis: i64) -> i32 {
        self.offset_seconds_at(epoch_millis.div_euclid(1000))
            .saturating_mul(1000)
    }

    /// Total UTC offset in milliseconds for a civil date and time.
    ///
    /// The civil time is read in the zone's standard time (raw offset),
    /// converted to an instant and looked up like any other instant.
    /// `month` is 1-based. Returns `None` for an invalid date or a
    /// `millis_in_day` outside `0..86_400_000`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zoneinfo_core::zone::{Era, ZoneInfo};
    ///
    /// let zone = ZoneInfo::fixed("Fixed/Minus5", -5 * 3600).unwrap();
    /// assert_eq!(zone.offset_for_civil(Era::AD, 2024, 2, 29, 0), Some(-5 * 3_600_000));
    /// assert_eq!(zone.offset_for_civil(Era::AD, 2023, 2, 29, 0), None);
    /// ```
    pub fn offset_for_civil(
        &self,
        era: Era,
        year: i32,
        month: u32,
        day: u32,
        millis_in_day: i64,
    ) -> Option<i32> {
        if !(0..MILLIS_PER_DAY).contains(&millis_in_day) {
            return None;
        }
        let year = match era {
            Era::AD => year,
            Era::BC => 1i32.checked_sub(year)?,
        };
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let local_millis = midnight.timestamp_millis() + millis_in_day;
        let utc_millis = local_millis - i64::from(self.raw_offset) * 1000;
        Some(self.offset_millis_at(utc_millis))
    }

    /// Whether daylight saving time is in effect at `when`.
    pub fn in_daylight_time(&self, when: &DateTime<Utc>) -> bool {
        self.is_daylight_time_at(when.timestamp())
    }

    /// The offset in effect at `when` as a chrono offset.
    ///
    /// Returns `None` if the offset is a day or more, which chrono cannot
    /// represent.
    pub fn fixed_offset_at(&self, when: &DateTime<Utc>) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.offset_seconds_at(when.timestamp()))
    }

    /// Convert `when` to local time in this zone.
    pub fn to_local(&self, when: &DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        self.fixed_offset_at(when).map(|offset| when.with_timezone(&offset))
    }

    /// Equality ignoring the zone identifier.
    pub fn has_same_rules(&self, other: &ZoneInfo) -> bool {
        self.raw_offset == other.raw_offset
            && self.uses_dst == other.uses_dst
            && self.dst_savings == other.dst_savings
            && self.table == other.table
    }

    /// Answer a single point-in-time query.
    pub fn lookup(&self, instant: i64) -> OffsetLookup {
        let ty = self.offset_type_at(instant);
        OffsetLookup {
            instant,
            zone: self.id.clone(),
            utc_offset_seconds: ty.utc_offset,
            utc_offset: format_offset(ty.utc_offset),
            is_dst: ty.is_dst,
        }
    }

    /// Zone-wide facts.
    pub fn summary(&self) -> ZoneSummary {
        ZoneSummary {
            id: self.id.clone(),
            raw_offset_seconds: self.raw_offset,
            uses_daylight_time: self.uses_dst,
            dst_savings_seconds: self.dst_savings,
            transition_count: self.table.len(),
            first_transition: self.table.first_instant(),
            last_transition: self.table.last_instant(),
            types: self.table.types().to_vec(),
        }
    }
}

impl fmt::Display for ZoneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ZoneInfo[id=\"{}\",raw_offset={},use_dst={},dst_savings={},transitions={}]",
            self.id,
            self.raw_offset,
            self.uses_dst,
            self.dst_savings,
            self.table.len()
        )
    }
}

/// DST delta of the zone's most recent DST type against its standard
/// (raw) offset.
fn derive_dst_savings(table: &TransitionTable, raw_offset: i32) -> i32 {
    if !table.has_dst_type() {
        return 0;
    }
    let dst = match table.last_dst_transition() {
        Some(index) => Some(table.type_of(&table.transitions()[index])),
        None => table.dst_offset_types().next().copied(),
    };
    let delta = dst.map_or(0, |dst| dst.utc_offset - raw_offset);
    if delta == 0 { DEFAULT_DST_SAVINGS } else { delta }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tzif::TzifBuilder;
    use chrono::TimeZone;

    const TYPE0: OffsetType = OffsetType::standard(3600);
    const TYPE1: OffsetType = OffsetType::daylight(1800);
    const TYPE2: OffsetType = OffsetType::standard(5400);

    fn prehistory_zone() -> ZoneInfo {
        let bytes = TzifBuilder::from_parts(
            &[(-5000, 0), (-2000, 1), (-500, 0), (0, 2)],
            &[TYPE0, TYPE1, TYPE2],
        )
        .build();
        ZoneInfo::from_tzif("test", &bytes).unwrap()
    }

    /// A Berlin-like zone: CET with CEST summers.
    fn central_european_zone() -> ZoneInfo {
        let bytes = TzifBuilder::from_parts(
            &[
                // 2026-03-29T01:00:00Z
                (1_774_746_000, 1),
                // 2026-10-25T01:00:00Z
                (1_792_890_000, 0),
            ],
            &[OffsetType::standard(3600), OffsetType::daylight(7200)],
        )
        .build();
        ZoneInfo::from_tzif("Test/Central", &bytes).unwrap()
    }

    #[test]
    fn prehistory_scenario() {
        let zone = prehistory_zone();
        assert_eq!(zone.offset_seconds_at(-9999), 3600);
        assert!(!zone.is_daylight_time_at(-9999));
        assert_eq!(zone.offset_seconds_at(-2000), 1800);
        assert!(zone.is_daylight_time_at(-2000));
        assert_eq!(zone.offset_seconds_at(-1), 3600);
        assert!(!zone.is_daylight_time_at(-1));
        assert_eq!(zone.offset_seconds_at(1000), 5400);
    }

    #[test]
    fn prehistory_zone_wide_facts() {
        let zone = prehistory_zone();
        assert_eq!(zone.raw_offset_seconds(), 5400);
        assert!(zone.use_daylight_time());
        // last DST offset 1800 against the latest standard offset 5400
        assert_eq!(zone.dst_savings_seconds(), 1800 - zone.raw_offset_seconds());
        assert_eq!(zone.dst_savings_seconds(), -3600);
    }

    #[test]
    fn lookup_at_transition_boundaries() {
        let zone = central_european_zone();
        for &(instant, offset, dst) in &[
            (1_774_745_999, 3600, false),
            (1_774_746_000, 7200, true),
            (1_774_746_001, 7200, true),
            (1_792_889_999, 7200, true),
            (1_792_890_000, 3600, false),
            (1_792_890_001, 3600, false),
        ] {
            assert_eq!(zone.offset_seconds_at(instant), offset, "instant={instant}");
            assert_eq!(zone.is_daylight_time_at(instant), dst, "instant={instant}");
        }
    }

    #[test]
    fn constant_offset_zone() {
        let bytes = TzifBuilder::new().offset_type(TYPE0).build();
        let zone = ZoneInfo::from_tzif("Fixed/Plus1", &bytes).unwrap();
        for instant in [i64::MIN, -1, 0, 1, 1_000_000_000, i64::MAX] {
            assert_eq!(zone.offset_seconds_at(instant), 3600);
            assert!(!zone.is_daylight_time_at(instant));
        }
        assert!(!zone.use_daylight_time());
        assert_eq!(zone.dst_savings_seconds(), 0);
        assert_eq!(zone, ZoneInfo::fixed("Fixed/Plus1", 3600).unwrap());
    }

    #[test]
    fn fixed_zone_rejects_out_of_range_offset() {
        use crate::error::MalformedReason;
        use crate::table::{OFFSET_MAX, OFFSET_MIN};

        assert!(ZoneInfo::fixed("Fixed/Max", OFFSET_MAX).is_ok());
        assert!(ZoneInfo::fixed("Fixed/Min", OFFSET_MIN).is_ok());
        match ZoneInfo::fixed("Fixed/TooFar", OFFSET_MAX + 1) {
            Err(ZoneError::MalformedZoneData { zone, reason }) => {
                assert_eq!(zone, "Fixed/TooFar");
                assert_eq!(
                    reason,
                    MalformedReason::OffsetOutOfRange {
                        index: 0,
                        offset: OFFSET_MAX + 1,
                    }
                );
            }
            other => panic!("Expected MalformedZoneData, got {other:?}"),
        }
    }

    #[test]
    fn dst_consistency_holds_for_varied_tables() {
        let tables: Vec<(Vec<(i64, u8)>, Vec<OffsetType>)> = vec![
            (vec![], vec![TYPE0]),
            (vec![(0, 0)], vec![TYPE0]),
            (vec![(0, 0), (10, 1)], vec![TYPE0, TYPE1]),
            // DST type that equals the standard offset
            (vec![(0, 0), (10, 1)], vec![TYPE0, OffsetType::daylight(3600)]),
            // DST type present but never used by a transition
            (vec![(0, 0)], vec![TYPE0, OffsetType::daylight(7200)]),
            // only DST transitions
            (vec![(0, 0)], vec![OffsetType::daylight(7200)]),
        ];
        for (transitions, types) in tables {
            let bytes = TzifBuilder::from_parts(&transitions, &types).build();
            let zone = ZoneInfo::from_tzif("test", &bytes).unwrap();
            assert_eq!(
                zone.use_daylight_time(),
                zone.dst_savings_seconds() != 0,
                "{zone}"
            );
        }
    }

    #[test]
    fn dst_savings_for_equal_offsets_uses_default() {
        let bytes = TzifBuilder::from_parts(
            &[(0, 0), (10, 1)],
            &[TYPE0, OffsetType::daylight(3600)],
        )
        .build();
        let zone = ZoneInfo::from_tzif("test", &bytes).unwrap();
        assert_eq!(zone.dst_savings_seconds(), DEFAULT_DST_SAVINGS);
    }

    #[test]
    fn dst_savings_for_unused_dst_type_is_relative_to_raw_offset() {
        let bytes =
            TzifBuilder::from_parts(&[(0, 0)], &[TYPE0, OffsetType::daylight(7200)]).build();
        let zone = ZoneInfo::from_tzif("test", &bytes).unwrap();
        assert!(zone.use_daylight_time());
        assert_eq!(zone.dst_savings_seconds(), 3600);
    }

    #[test]
    fn offset_millis_rounds_toward_negative_infinity() {
        let zone = prehistory_zone();
        // -1 ms is inside second -1, before the transition at 0.
        assert_eq!(zone.offset_millis_at(-1), 3_600_000);
        assert_eq!(zone.offset_millis_at(0), 5_400_000);
        assert_eq!(zone.offset_millis_at(-2_000_000), 1_800_000);
    }

    #[test]
    fn offset_for_civil_uses_standard_time() {
        let zone = central_european_zone();
        // 2026-07-01 12:00 standard time is inside the DST period.
        assert_eq!(
            zone.offset_for_civil(Era::AD, 2026, 7, 1, 12 * 3_600_000),
            Some(7_200_000)
        );
        assert_eq!(
            zone.offset_for_civil(Era::AD, 2026, 1, 15, 0),
            Some(3_600_000)
        );
        // 2026-03-29 02:00 standard time is exactly the transition instant.
        assert_eq!(
            zone.offset_for_civil(Era::AD, 2026, 3, 29, 2 * 3_600_000),
            Some(7_200_000)
        );
        assert_eq!(
            zone.offset_for_civil(Era::AD, 2026, 3, 29, 2 * 3_600_000 - 1),
            Some(3_600_000)
        );
    }

    #[test]
    fn offset_for_civil_rejects_invalid_fields() {
        let zone = central_european_zone();
        assert_eq!(zone.offset_for_civil(Era::AD, 2026, 13, 1, 0), None);
        assert_eq!(zone.offset_for_civil(Era::AD, 2026, 1, 1, -1), None);
        assert_eq!(zone.offset_for_civil(Era::AD, 2026, 1, 1, MILLIS_PER_DAY), None);
        assert_eq!(zone.offset_for_civil(Era::BC, 1, 1, 1, 0), Some(3_600_000));
    }

    #[test]
    fn chrono_helpers() {
        let zone = central_european_zone();
        let summer = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).single().unwrap();
        let winter = Utc.with_ymd_and_hms(2026, 12, 1, 12, 0, 0).single().unwrap();

        assert!(zone.in_daylight_time(&summer));
        assert!(!zone.in_daylight_time(&winter));
        assert_eq!(
            zone.to_local(&summer).unwrap().to_rfc3339(),
            "2026-07-01T14:00:00+02:00"
        );
        assert_eq!(
            zone.fixed_offset_at(&winter),
            FixedOffset::east_opt(3600)
        );
    }

    #[test]
    fn equality_is_structural() {
        let a = prehistory_zone();
        let b = prehistory_zone();
        assert_eq!(a, b);

        let renamed = ZoneInfo::from_table("other", a.table().clone(), 5400);
        assert_ne!(a, renamed);
        assert!(a.has_same_rules(&renamed));

        assert_ne!(a, central_european_zone());
        assert!(!a.has_same_rules(&central_european_zone()));
    }

    #[test]
    fn summary_and_display() {
        let zone = prehistory_zone();
        let summary = zone.summary();
        assert_eq!(summary.transition_count, 4);
        assert_eq!(summary.first_transition, Some(-5000));
        assert_eq!(summary.last_transition, Some(0));
        assert_eq!(summary.types, vec![TYPE0, TYPE1, TYPE2]);
        assert_eq!(
            zone.to_string(),
            "ZoneInfo[id=\"test\",raw_offset=5400,use_dst=true,dst_savings=-3600,transitions=4]"
        );
    }

    #[test]
    fn lookups_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ZoneInfo>();

        let zone = central_european_zone();
        std::thread::scope(|scope| {
            for offset in 0..4i64 {
                let zone = &zone;
                scope.spawn(move || {
                    for step in 0..1_000i64 {
                        let instant = 1_774_000_000 + offset * 500_000 + step * 1_000;
                        let ty = zone.offset_type_at(instant);
                        assert_eq!(ty.is_dst, ty.utc_offset == 7200);
                    }
                });
            }
        });
    }
}
