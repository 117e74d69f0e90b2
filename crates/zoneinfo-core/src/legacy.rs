//! Versioned encode/decode of the legacy persisted zone record.
//!
//! Older persisted zones stored the DST savings and a "uses DST" flag as two
//! independent fields, and the two could disagree (a non-zero savings value
//! next to a `false` flag). On decode both fields are treated as untrusted:
//! the zone is rebuilt from the persisted transition and type arrays and the
//! public DST answers are derived from the rebuilt type list, exactly as for
//! a freshly parsed zone.
//!
//! Decoding walks through the stages of [`LegacyStage`]:
//! `RawBytesLoaded -> FieldsExtracted -> TableReconstructed -> Reconciled`.
//! A failure at any stage is terminal and reports that stage.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LegacyStage, Result, ZoneError};
use crate::models::OffsetType;
use crate::table::TransitionTable;
use crate::zone::ZoneInfo;

/// Version written by [`encode`] and accepted by [`decode`].
pub const LEGACY_FORMAT_VERSION: u32 = 1;

/// The persisted field set of a zone.
///
/// `type_offsets` are stored relative to `raw_offset_seconds`, as the
/// legacy layout did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRecord {
    pub version: u32,
    pub id: String,
    pub raw_offset_seconds: i32,
    pub transitions: Vec<i64>,
    pub transition_types: Vec<u8>,
    pub type_offsets: Vec<i32>,
    pub type_is_dst: Vec<u8>,
    pub use_dst: bool,
    pub dst_savings_seconds: i32,
}

impl LegacyRecord {
    /// Capture a zone in the persisted layout.
    pub fn from_zone(zone: &ZoneInfo) -> Result<Self> {
        let raw = zone.raw_offset_seconds();
        let table = zone.table();
        let type_offsets = table
            .types()
            .iter()
            .map(|ty| {
                ty.utc_offset.checked_sub(raw).ok_or_else(|| {
                    ZoneError::legacy(
                        LegacyStage::FieldsExtracted,
                        format!("offset {} not representable against {raw}", ty.utc_offset),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LegacyRecord {
            version: LEGACY_FORMAT_VERSION,
            id: zone.id().to_string(),
            raw_offset_seconds: raw,
            transitions: table.transitions().iter().map(|t| t.instant).collect(),
            transition_types: table.transitions().iter().map(|t| t.type_index).collect(),
            type_offsets,
            type_is_dst: table.types().iter().map(|t| u8::from(t.is_dst)).collect(),
            use_dst: zone.use_daylight_time(),
            dst_savings_seconds: zone.dst_savings_seconds(),
        })
    }

    /// Rebuild the zone described by this record.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::LegacyFormat`] for an unknown version,
    /// mismatched array lengths, invalid DST flags, or a table that violates
    /// its ordering or index invariants.
    pub fn into_zone(self) -> Result<ZoneInfo> {
        self.check_fields()?;
        let table = self.reconstruct_table()?;
        Ok(self.reconcile(table))
    }

    fn check_fields(&self) -> Result<()> {
        let fail = |message: String| Err(ZoneError::legacy(LegacyStage::FieldsExtracted, message));
        if self.version != LEGACY_FORMAT_VERSION {
            return fail(format!("unsupported record version {}", self.version));
        }
        if self.transitions.len() != self.transition_types.len() {
            return fail(format!(
                "{} transitions but {} transition types",
                self.transitions.len(),
                self.transition_types.len()
            ));
        }
        if self.type_offsets.len() != self.type_is_dst.len() {
            return fail(format!(
                "{} type offsets but {} DST flags",
                self.type_offsets.len(),
                self.type_is_dst.len()
            ));
        }
        Ok(())
    }

    fn reconstruct_table(&self) -> Result<TransitionTable> {
        let fail = |message: String| ZoneError::legacy(LegacyStage::TableReconstructed, message);

        let mut types = Vec::with_capacity(self.type_offsets.len());
        let pairs = self.type_offsets.iter().zip(&self.type_is_dst);
        for (index, (&relative, &flag)) in pairs.enumerate() {
            let is_dst = match flag {
                0 => false,
                1 => true,
                other => return Err(fail(format!("type {index} has invalid DST flag {other}"))),
            };
            let utc_offset = relative
                .checked_add(self.raw_offset_seconds)
                .ok_or_else(|| fail(format!("type {index} offset overflows")))?;
            types.push(OffsetType { utc_offset, is_dst });
        }

        let transitions = self
            .transitions
            .iter()
            .zip(&self.transition_types)
            .map(|(&instant, &index)| (instant, usize::from(index)));

        TransitionTable::new(transitions, &types).map_err(|reason| fail(reason.to_string()))
    }

    fn reconcile(&self, table: TransitionTable) -> ZoneInfo {
        let zone = ZoneInfo::from_table(self.id.as_str(), table, self.raw_offset_seconds);

        if !self.use_dst && self.dst_savings_seconds != 0 {
            // Savings behind a cleared flag were never visible to callers.
            debug!(
                zone = %self.id,
                persisted_savings = self.dst_savings_seconds,
                "ignoring DST savings persisted with DST disabled"
            );
        } else if self.use_dst != zone.use_daylight_time()
            || self.dst_savings_seconds != zone.dst_savings_seconds()
        {
            warn!(
                zone = %self.id,
                persisted_use_dst = self.use_dst,
                persisted_savings = self.dst_savings_seconds,
                use_dst = zone.use_daylight_time(),
                savings = zone.dst_savings_seconds(),
                "persisted DST fields disagree with the transition table"
            );
        }
        zone
    }
}

/// Encode a zone as a versioned legacy record.
///
/// # Examples
///
/// ```
/// use zoneinfo_core::legacy::{decode, encode};
/// use zoneinfo_core::zone::ZoneInfo;
///
/// let zone = ZoneInfo::fixed("Fixed/Plus1", 3600).unwrap();
/// let bytes = encode(&zone).unwrap();
/// assert_eq!(decode(&bytes).unwrap(), zone);
/// ```
pub fn encode(zone: &ZoneInfo) -> Result<Vec<u8>> {
    let record = LegacyRecord::from_zone(zone)?;
    serde_json::to_vec(&record)
        .map_err(|e| ZoneError::legacy(LegacyStage::FieldsExtracted, e.to_string()))
}

/// Decode a versioned legacy record into a zone.
///
/// # Errors
///
/// Returns [`ZoneError::LegacyFormat`] naming the stage that failed. No
/// partially built zone is ever returned.
pub fn decode(bytes: &[u8]) -> Result<ZoneInfo> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ZoneError::legacy(LegacyStage::RawBytesLoaded, e.to_string()))?;
    let record: LegacyRecord = serde_json::from_value(value)
        .map_err(|e| ZoneError::legacy(LegacyStage::FieldsExtracted, e.to_string()))?;
    record.into_zone()
}
