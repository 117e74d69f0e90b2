//! Transition tables and point-in-time lookup.
//!
//! A [`TransitionTable`] owns the decoded transitions of one zone together
//! with the distinct offset types they refer to. It is immutable once built
//! and every lookup is a binary search over the transition instants, so a
//! table can be shared across threads without synchronization.

use crate::error::MalformedReason;
use crate::models::{OffsetType, Transition};

/// Upper bound on distinct offset types; type indices are stored as `u8`.
pub const MAX_TYPES: usize = 256;

/// Smallest accepted UTC offset, `-25:59:59`.
pub const OFFSET_MIN: i32 = -93_599;
/// Largest accepted UTC offset, `+25:59:59`.
pub const OFFSET_MAX: i32 = 93_599;

/// An ordered set of transitions and the offset types they index into.
///
/// Invariants, checked by [`TransitionTable::new`]:
/// - transition instants are strictly increasing
/// - every type index is valid for the type list
/// - the type list holds no duplicate `(utc_offset, is_dst)` pairs
/// - every offset lies within [`OFFSET_MIN`]`..=`[`OFFSET_MAX`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
    types: Vec<OffsetType>,
    prehistory: Option<OffsetType>,
}

impl TransitionTable {
    /// Build a table from `(instant, type index)` pairs and a type list.
    ///
    /// Duplicate types are merged and indices remapped, so two inputs that
    /// differ only in how often a type is repeated produce equal tables.
    ///
    /// # Errors
    ///
    /// Returns the violated invariant if the instants are not strictly
    /// increasing, a type index is out of range, or an offset is outside
    /// the supported range.
    pub fn new<I>(transitions: I, types: &[OffsetType]) -> Result<Self, MalformedReason>
    where
        I: IntoIterator<Item = (i64, usize)>,
    {
        let (distinct, remap) = dedup_types(types)?;

        let mut table = Vec::new();
        let mut previous: Option<i64> = None;
        for (index, (instant, type_index)) in transitions.into_iter().enumerate() {
            let Some(&mapped) = remap.get(type_index) else {
                return Err(MalformedReason::TypeIndexOutOfRange {
                    index,
                    type_index,
                    type_count: types.len(),
                });
            };
            if let Some(previous) = previous {
                if instant <= previous {
                    return Err(MalformedReason::UnsortedTransitions {
                        index,
                        instant,
                        previous,
                    });
                }
            }
            previous = Some(instant);
            table.push(Transition {
                instant,
                type_index: mapped,
            });
        }

        let prehistory = earliest_standard_type(&table, &distinct);
        Ok(TransitionTable {
            transitions: table,
            types: distinct,
            prehistory,
        })
    }

    /// An empty table for a zone with a single constant offset.
    pub fn empty() -> Self {
        TransitionTable::default()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The transitions, ordered by instant.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The distinct offset types.
    pub fn types(&self) -> &[OffsetType] {
        &self.types
    }

    /// The offset type a transition switches to.
    pub fn type_of(&self, transition: &Transition) -> OffsetType {
        self.types[usize::from(transition.type_index)]
    }

    /// The DST types of the zone, in type-list order.
    pub fn dst_offset_types(&self) -> impl Iterator<Item = &OffsetType> {
        self.types.iter().filter(|t| t.is_dst)
    }

    /// Whether any offset type of the zone is a DST type.
    pub fn has_dst_type(&self) -> bool {
        self.types.iter().any(|t| t.is_dst)
    }

    /// Index of the greatest transition whose instant is `<= instant`.
    pub fn transition_index_at(&self, instant: i64) -> Option<usize> {
        self.transitions
            .partition_point(|t| t.instant <= instant)
            .checked_sub(1)
    }

    /// The offset type in effect at `instant`.
    ///
    /// Returns `None` only for an empty table; the owning zone then applies
    /// its raw offset. For an instant before the first transition the
    /// earliest standard type is used, falling back to the type of the
    /// first transition when every transition is into DST.
    ///
    /// # Examples
    ///
    /// ```
    /// use zoneinfo_core::models::OffsetType;
    /// use zoneinfo_core::table::TransitionTable;
    ///
    /// let types = [OffsetType::standard(3600), OffsetType::daylight(7200)];
    /// let table = TransitionTable::new([(100, 1), (200, 0)], &types).unwrap();
    ///
    /// assert_eq!(table.offset_type_at(150), Some(types[1]));
    /// assert_eq!(table.offset_type_at(200), Some(types[0]));
    /// // Before the first transition: the earliest standard type.
    /// assert_eq!(table.offset_type_at(0), Some(types[0]));
    /// ```
    pub fn offset_type_at(&self, instant: i64) -> Option<OffsetType> {
        match self.transition_index_at(instant) {
            Some(index) => Some(self.type_of(&self.transitions[index])),
            None => self.prehistory,
        }
    }

    /// The type used for instants before the first transition.
    pub fn earliest_standard_type(&self) -> Option<OffsetType> {
        self.prehistory
    }

    /// Offset of the most recent transition into a standard type.
    pub fn latest_standard_offset(&self) -> Option<i32> {
        self.transitions
            .iter()
            .rev()
            .map(|t| self.type_of(t))
            .find(|t| !t.is_dst)
            .map(|t| t.utc_offset)
    }

    /// Index of the most recent transition into a DST type.
    pub fn last_dst_transition(&self) -> Option<usize> {
        self.transitions
            .iter()
            .rposition(|t| self.type_of(t).is_dst)
    }

    pub fn first_instant(&self) -> Option<i64> {
        self.transitions.first().map(|t| t.instant)
    }

    pub fn last_instant(&self) -> Option<i64> {
        self.transitions.last().map(|t| t.instant)
    }
}

fn dedup_types(types: &[OffsetType]) -> Result<(Vec<OffsetType>, Vec<u8>), MalformedReason> {
    let mut distinct: Vec<OffsetType> = Vec::with_capacity(types.len());
    let mut remap = Vec::with_capacity(types.len());
    for (index, ty) in types.iter().enumerate() {
        if !(OFFSET_MIN..=OFFSET_MAX).contains(&ty.utc_offset) {
            return Err(MalformedReason::OffsetOutOfRange {
                index,
                offset: ty.utc_offset,
            });
        }
        let slot = match distinct.iter().position(|d| d == ty) {
            Some(slot) => slot,
            None => {
                distinct.push(*ty);
                distinct.len() - 1
            }
        };
        if slot >= MAX_TYPES {
            return Err(MalformedReason::TooManyTypes(slot + 1));
        }
        remap.push(slot as u8);
    }
    Ok((distinct, remap))
}

fn earliest_standard_type(transitions: &[Transition], types: &[OffsetType]) -> Option<OffsetType> {
    let type_of = |t: &Transition| types[usize::from(t.type_index)];
    transitions
        .iter()
        .map(type_of)
        .find(|t| !t.is_dst)
        .or_else(|| transitions.first().map(type_of))
}
