use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat};
use tracing::debug;
use zoneinfo_core::{DirectoryProvider, ZoneCache, ZoneInfo};

use crate::cli::ZoneSource;
use crate::error::{CliError, CliResult};

/// How instants are written in lookup input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantFormat {
    EpochS,
    EpochMs,
    Rfc3339,
}

pub fn parse_format(s: &str) -> CliResult<InstantFormat> {
    match s.to_lowercase().as_str() {
        "epoch_s" => Ok(InstantFormat::EpochS),
        "epoch_ms" => Ok(InstantFormat::EpochMs),
        "rfc3339" => Ok(InstantFormat::Rfc3339),
        _ => Err(CliError::input(format!(
            "Invalid format '{}'. Expected: epoch_s, epoch_ms, rfc3339",
            s
        ))),
    }
}

/// Parse one instant to seconds since the epoch.
///
/// Millisecond inputs are floored to the containing second.
pub fn parse_instant(input: &str, format: InstantFormat) -> CliResult<i64> {
    match format {
        InstantFormat::EpochS => input.parse::<i64>().map_err(|_| {
            CliError::input(format!(
                "Invalid epoch seconds: '{}'. Expected integer value.",
                input
            ))
        }),
        InstantFormat::EpochMs => input
            .parse::<i64>()
            .map(|ms| ms.div_euclid(1000))
            .map_err(|_| {
                CliError::input(format!(
                    "Invalid epoch milliseconds: '{}'. Expected integer value.",
                    input
                ))
            }),
        InstantFormat::Rfc3339 => DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.timestamp())
            .map_err(|e| CliError::input(format!("Failed to parse RFC3339 '{}': {}", input, e))),
    }
}

/// Render an instant as RFC3339 in UTC, or as plain seconds when it is
/// outside chrono's range.
pub fn format_instant(instant: i64) -> String {
    match DateTime::from_timestamp(instant, 0) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => instant.to_string(),
    }
}

pub fn load_zone(source: &ZoneSource) -> CliResult<Arc<ZoneInfo>> {
    debug!(
        zoneinfo_dir = %source.zoneinfo_dir.display(),
        zone = %source.zone,
        "loading zone"
    );
    let cache = ZoneCache::new(DirectoryProvider::new(&source.zoneinfo_dir));
    Ok(cache.get(&source.zone)?)
}

pub fn open_lines(input: &str, stdin: bool) -> CliResult<Box<dyn BufRead>> {
    if stdin || input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(input)
        .map_err(|e| CliError::runtime(format!("Failed to open file '{}': {}", input, e)))?;
    Ok(Box::new(BufReader::new(file)))
}

pub fn read_all(input: &str) -> CliResult<Vec<u8>> {
    if input == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| CliError::runtime(format!("Failed to read stdin: {}", e)))?;
        return Ok(bytes);
    }
    fs::read(input).map_err(|e| CliError::runtime(format!("Failed to read file '{}': {}", input, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_instant_formats() {
        assert_eq!(parse_instant("1780000000", InstantFormat::EpochS).unwrap(), 1_780_000_000);
        assert_eq!(parse_instant("-1", InstantFormat::EpochS).unwrap(), -1);
        assert_eq!(parse_instant("1780000000999", InstantFormat::EpochMs).unwrap(), 1_780_000_000);
        assert_eq!(parse_instant("-1", InstantFormat::EpochMs).unwrap(), -1);
        assert_eq!(
            parse_instant("2026-03-29T03:00:00+02:00", InstantFormat::Rfc3339).unwrap(),
            1_774_746_000
        );
    }

    #[test]
    fn rejects_garbage_as_input_error() {
        let err = parse_instant("soon", InstantFormat::EpochS).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT_ERROR);
        assert!(parse_format("iso").is_err());
    }

    #[test]
    fn formats_instants_in_utc() {
        assert_eq!(format_instant(1_774_746_000), "2026-03-29T01:00:00Z");
        assert_eq!(format_instant(i64::MAX), i64::MAX.to_string());
    }
}
