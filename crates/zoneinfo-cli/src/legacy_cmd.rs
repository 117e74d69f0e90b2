use std::io::{self, Write};
use std::process::ExitCode;

use tracing::debug;
use zoneinfo_core::legacy;

use crate::cli::{ExportLegacyArgs, ImportLegacyArgs};
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{load_zone, read_all};
use crate::summary_cmd::print_summary;

pub fn run_export_legacy(args: ExportLegacyArgs) -> CliResult<ExitCode> {
    let zone = load_zone(&args.source)?;
    let bytes = legacy::encode(&zone)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|()| writeln!(stdout))
        .map_err(|e| CliError::runtime(format!("Failed to write record: {}", e)))?;

    debug!(zone = zone.id(), bytes = bytes.len(), "exported legacy record");
    Ok(ExitCode::from(EXIT_SUCCESS))
}

pub fn run_import_legacy(args: ImportLegacyArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let bytes = read_all(&args.input)?;
    let zone = legacy::decode(&bytes)?;
    print_summary(&zone.summary(), output_format)?;
    Ok(ExitCode::from(EXIT_SUCCESS))
}
