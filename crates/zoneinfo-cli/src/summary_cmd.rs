use std::process::ExitCode;

use zoneinfo_core::ZoneSummary;
use zoneinfo_core::models::format_offset;

use crate::cli::SummaryArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{format_instant, load_zone};

pub fn run_summary(args: SummaryArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let zone = load_zone(&args.source)?;
    print_summary(&zone.summary(), output_format)?;
    Ok(ExitCode::from(EXIT_SUCCESS))
}

/// Print zone-wide facts in the requested format.
pub fn print_summary(summary: &ZoneSummary, output_format: OutputFormat) -> CliResult<()> {
    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("Zone: {}", summary.id);
            println!(
                "Raw offset: {} ({} s)",
                format_offset(summary.raw_offset_seconds),
                summary.raw_offset_seconds
            );
            println!("Uses daylight time: {}", summary.uses_daylight_time);
            println!("DST savings: {} s", summary.dst_savings_seconds);
            match (summary.first_transition, summary.last_transition) {
                (Some(first), Some(last)) => println!(
                    "Transitions: {} ({} to {})",
                    summary.transition_count,
                    format_instant(first),
                    format_instant(last)
                ),
                _ => println!("Transitions: {}", summary.transition_count),
            }
            let types: Vec<String> = summary.types.iter().map(|t| t.to_string()).collect();
            println!("Types: {}", types.join(", "));
        }
    }
    Ok(())
}
