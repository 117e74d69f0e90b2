//! Decoding and encoding of compiled zone data (TZif, RFC 8536).
//!
//! Only the transition and offset-type sections are retained. Version 1
//! files are read from their 32-bit block; for version 2 and later the
//! 32-bit block is skipped and the 64-bit block is read instead. Leap
//! second records, indicators, abbreviations and the POSIX footer are
//! skipped.

use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{MalformedReason, Result, ZoneError};
use crate::models::OffsetType;
use crate::table::TransitionTable;

const MAGIC: &[u8; 4] = b"TZif";
const HEADER_LEN: usize = 44;
const TYPE_RECORD_LEN: usize = 6;

/// The decoded contents of one compiled zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedZone {
    /// The transition table.
    pub table: TransitionTable,
    /// Offset of the first standard type record, used when no transition
    /// applies.
    pub declared_raw_offset: i32,
}

/// Parse compiled zone data for the zone `name`.
///
/// # Errors
///
/// Returns [`ZoneError::MalformedZoneData`] when the buffer is truncated,
/// carries an unknown version, declares no types, refers to a type that
/// does not exist, or lists transitions out of order.
///
/// # Examples
///
/// ```
/// use zoneinfo_core::models::OffsetType;
/// use zoneinfo_core::tzif::{TzifBuilder, parse};
///
/// let bytes = TzifBuilder::new()
///     .offset_type(OffsetType::standard(3600))
///     .offset_type(OffsetType::daylight(7200))
///     .transition(1_000, 1)
///     .transition(2_000, 0)
///     .build();
///
/// let parsed = parse("Test/Zone", &bytes).unwrap();
/// assert_eq!(parsed.table.len(), 2);
/// assert_eq!(parsed.declared_raw_offset, 3600);
/// ```
pub fn parse(name: &str, bytes: &[u8]) -> Result<ParsedZone> {
    let malformed = |reason| ZoneError::malformed(name, reason);
    let mut cursor = Cursor::new(bytes);

    let first = Header::read(&mut cursor).map_err(malformed)?;
    let (header, time_size) = if first.version == 0 {
        (first, 4)
    } else {
        skip(&mut cursor, first.data_len(4), "version 1 data block").map_err(malformed)?;
        (Header::read(&mut cursor).map_err(malformed)?, 8)
    };
    let block = Block::read(&mut cursor, &header, time_size).map_err(malformed)?;

    let declared_raw_offset = block
        .types
        .iter()
        .find(|t| !t.is_dst)
        .or(block.types.first())
        .map(|t| t.utc_offset)
        .ok_or_else(|| malformed(MalformedReason::NoTypes))?;

    let table = TransitionTable::new(block.transitions, &block.types).map_err(malformed)?;

    debug!(
        zone = name,
        version = header.version,
        transitions = table.len(),
        types = table.types().len(),
        "parsed compiled zone data"
    );

    Ok(ParsedZone {
        table,
        declared_raw_offset,
    })
}

#[derive(Debug, Clone, Copy)]
struct Header {
    version: u8,
    isutcnt: usize,
    isstdcnt: usize,
    leapcnt: usize,
    timecnt: usize,
    typecnt: usize,
    charcnt: usize,
}

impl Header {
    fn read(cursor: &mut Cursor<&[u8]>) -> std::result::Result<Header, MalformedReason> {
        let mut magic = [0u8; 4];
        cursor
            .read_exact(&mut magic)
            .map_err(|_| MalformedReason::MagicValue)?;
        if &magic != MAGIC {
            return Err(MalformedReason::MagicValue);
        }
        if remaining(cursor) < HEADER_LEN - MAGIC.len() {
            return Err(MalformedReason::Truncated("header"));
        }

        let version = match cursor.read_u8().map_err(truncated("header"))? {
            0 => 0,
            v @ b'2'..=b'4' => v - b'0',
            other => return Err(MalformedReason::Version(other)),
        };
        skip(cursor, Some(15), "header")?;

        let mut count = || -> std::result::Result<usize, MalformedReason> {
            let value = cursor.read_u32::<BigEndian>().map_err(truncated("header"))?;
            usize::try_from(value).map_err(|_| MalformedReason::Truncated("header"))
        };
        Ok(Header {
            version,
            isutcnt: count()?,
            isstdcnt: count()?,
            leapcnt: count()?,
            timecnt: count()?,
            typecnt: count()?,
            charcnt: count()?,
        })
    }

    /// Length of the data block following this header, `None` on overflow.
    fn data_len(&self, time_size: usize) -> Option<usize> {
        let transitions = self.timecnt.checked_mul(time_size + 1)?;
        let types = self.typecnt.checked_mul(TYPE_RECORD_LEN)?;
        let leaps = self.leapcnt.checked_mul(time_size + 4)?;
        transitions
            .checked_add(types)?
            .checked_add(self.charcnt)?
            .checked_add(leaps)?
            .checked_add(self.isstdcnt)?
            .checked_add(self.isutcnt)
    }
}

struct Block {
    transitions: Vec<(i64, usize)>,
    types: Vec<OffsetType>,
}

impl Block {
    fn read(
        cursor: &mut Cursor<&[u8]>,
        header: &Header,
        time_size: usize,
    ) -> std::result::Result<Block, MalformedReason> {
        let remaining = remaining(cursor);
        match header.data_len(time_size) {
            Some(len) if len <= remaining => {}
            _ => return Err(MalformedReason::Truncated("data block")),
        }
        if header.typecnt == 0 {
            return Err(MalformedReason::NoTypes);
        }

        let mut instants = Vec::with_capacity(header.timecnt);
        for _ in 0..header.timecnt {
            let instant = if time_size == 4 {
                i64::from(cursor.read_i32::<BigEndian>().map_err(truncated("transitions"))?)
            } else {
                cursor.read_i64::<BigEndian>().map_err(truncated("transitions"))?
            };
            instants.push(instant);
        }

        let mut transitions = Vec::with_capacity(header.timecnt);
        for instant in instants {
            let index = cursor.read_u8().map_err(truncated("transition types"))?;
            transitions.push((instant, usize::from(index)));
        }

        let mut types = Vec::with_capacity(header.typecnt);
        for index in 0..header.typecnt {
            let utc_offset = cursor
                .read_i32::<BigEndian>()
                .map_err(truncated("offset types"))?;
            let is_dst = match cursor.read_u8().map_err(truncated("offset types"))? {
                0 => false,
                1 => true,
                flag => return Err(MalformedReason::InvalidDstFlag { index, flag }),
            };
            // abbreviation index
            cursor.read_u8().map_err(truncated("offset types"))?;
            types.push(OffsetType { utc_offset, is_dst });
        }

        let trailing = header.charcnt
            + header.leapcnt * (time_size + 4)
            + header.isstdcnt
            + header.isutcnt;
        skip(cursor, Some(trailing), "trailing records")?;

        Ok(Block { transitions, types })
    }
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    let len = cursor.get_ref().len() as u64;
    len.saturating_sub(cursor.position()) as usize
}

fn skip(
    cursor: &mut Cursor<&[u8]>,
    len: Option<usize>,
    what: &'static str,
) -> std::result::Result<(), MalformedReason> {
    match len {
        Some(len) if len <= remaining(cursor) => {
            cursor.set_position(cursor.position() + len as u64);
            Ok(())
        }
        _ => Err(MalformedReason::Truncated(what)),
    }
}

fn truncated(what: &'static str) -> impl Fn(io::Error) -> MalformedReason {
    move |_| MalformedReason::Truncated(what)
}

/// Output layout produced by [`TzifBuilder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TzifVersion {
    /// A single block with 32-bit instants. Instants outside the `i32`
    /// range are saturated.
    V1,
    /// A 32-bit block holding the transitions that fit, followed by a
    /// 64-bit block holding all of them and an empty footer.
    #[default]
    V2,
}

/// Writes compiled zone data from transitions and offset types.
///
/// The builder writes exactly what it is given, including out-of-order
/// transitions or dangling type indices, which makes it usable for
/// producing malformed inputs as well.
#[derive(Debug, Clone, Default)]
pub struct TzifBuilder {
    version: TzifVersion,
    transitions: Vec<(i64, u8)>,
    types: Vec<OffsetType>,
}

impl TzifBuilder {
    pub fn new() -> Self {
        TzifBuilder::default()
    }

    /// Start from `(instant, type index)` pairs and a type list.
    pub fn from_parts(transitions: &[(i64, u8)], types: &[OffsetType]) -> Self {
        TzifBuilder {
            version: TzifVersion::default(),
            transitions: transitions.to_vec(),
            types: types.to_vec(),
        }
    }

    pub fn version(mut self, version: TzifVersion) -> Self {
        self.version = version;
        self
    }

    pub fn transition(mut self, instant: i64, type_index: u8) -> Self {
        self.transitions.push((instant, type_index));
        self
    }

    pub fn offset_type(mut self, offset_type: OffsetType) -> Self {
        self.types.push(offset_type);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self.version {
            TzifVersion::V1 => {
                let saturated: Vec<(i64, u8)> = self
                    .transitions
                    .iter()
                    .map(|&(instant, index)| {
                        (instant.clamp(i32::MIN.into(), i32::MAX.into()), index)
                    })
                    .collect();
                self.write_block(&mut out, 0, &saturated, 4);
            }
            TzifVersion::V2 => {
                let fitting: Vec<(i64, u8)> = self
                    .transitions
                    .iter()
                    .copied()
                    .filter(|&(instant, _)| i32::try_from(instant).is_ok())
                    .collect();
                self.write_block(&mut out, b'2', &fitting, 4);
                self.write_block(&mut out, b'2', &self.transitions, 8);
                out.extend_from_slice(b"\n\n");
            }
        }
        out
    }

    fn write_block(
        &self,
        out: &mut Vec<u8>,
        version: u8,
        transitions: &[(i64, u8)],
        time_size: usize,
    ) {
        out.extend_from_slice(MAGIC);
        out.push(version);
        out.extend_from_slice(&[0u8; 15]);
        // isutcnt, isstdcnt, leapcnt
        for _ in 0..3 {
            out.extend_from_slice(&0u32.to_be_bytes());
        }
        out.extend_from_slice(&(transitions.len() as u32).to_be_bytes());
        out.extend_from_slice(&(self.types.len() as u32).to_be_bytes());
        // charcnt: a single empty designation shared by every type
        out.extend_from_slice(&1u32.to_be_bytes());

        for &(instant, _) in transitions {
            if time_size == 4 {
                out.extend_from_slice(&(instant as i32).to_be_bytes());
            } else {
                out.extend_from_slice(&instant.to_be_bytes());
            }
        }
        out.extend(transitions.iter().map(|&(_, index)| index));
        for ty in &self.types {
            out.extend_from_slice(&ty.utc_offset.to_be_bytes());
            out.push(u8::from(ty.is_dst));
            out.push(0);
        }
        out.push(0);
    }
}
