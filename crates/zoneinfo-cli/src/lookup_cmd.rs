use std::io::BufRead;
use std::process::ExitCode;

use serde::Serialize;
use tracing::debug;
use zoneinfo_core::{OffsetLookup, ZoneInfo};

use crate::cli::LookupArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{InstantFormat, format_instant, load_zone, open_lines, parse_format, parse_instant};

#[derive(Debug, Serialize)]
struct LookupLine<'a> {
    input: &'a str,
    #[serde(flatten)]
    lookup: OffsetLookup,
}

pub fn run_lookup(args: LookupArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let format = parse_format(&args.format)?;
    let zone = load_zone(&args.source)?;
    let reader = open_lines(&args.input, args.stdin)?;

    let mut count = 0usize;
    for line in reader.lines() {
        let line = line.map_err(|e| CliError::runtime(format!("Failed to read line: {}", e)))?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let lookup = process_lookup_line(trimmed, &zone, format)
            .map_err(|e| CliError::input(format!("Error processing '{}': {}", trimmed, e)))?;
        count += 1;

        match output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string(&LookupLine {
                    input: trimmed,
                    lookup,
                })
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
                println!("{}", json);
            }
            OutputFormat::Text => {
                let label = if lookup.is_dst { " (dst)" } else { "" };
                println!(
                    "{} -> {}{}",
                    format_instant(lookup.instant),
                    lookup.utc_offset,
                    label
                );
            }
        }
    }

    debug!(zone = zone.id(), count, "answered lookups");
    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn process_lookup_line(
    input: &str,
    zone: &ZoneInfo,
    format: InstantFormat,
) -> CliResult<OffsetLookup> {
    let instant = parse_instant(input, format)?;
    Ok(zone.lookup(instant))
}
