use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect compiled time zone data and legacy zone records
#[derive(Parser, Debug)]
#[command(name = "zoneinfo", version)]
#[command(about = "Inspect compiled time zone data and legacy zone records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up the UTC offset in effect at each input instant
    Lookup(LookupArgs),
    /// Print zone-wide facts: raw offset, DST usage, DST savings
    Summary(SummaryArgs),
    /// Write a zone as a legacy persisted record
    ExportLegacy(ExportLegacyArgs),
    /// Decode a legacy persisted record and print its summary
    ImportLegacy(ImportLegacyArgs),
}

#[derive(clap::Args, Debug)]
pub struct ZoneSource {
    /// Directory holding compiled zone files
    #[arg(long, env = "ZONEINFO_DIR", default_value = "/usr/share/zoneinfo")]
    pub zoneinfo_dir: PathBuf,

    /// Zone identifier (e.g., Europe/Berlin)
    #[arg(short, long)]
    pub zone: String,
}

#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    #[command(flatten)]
    pub source: ZoneSource,

    /// Input format: epoch_s, epoch_ms, rfc3339
    #[arg(short = 'f', long, default_value = "epoch_s")]
    pub format: String,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,

    /// Input file path (use - for stdin)
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Read from stdin
    #[arg(long)]
    pub stdin: bool,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: ZoneSource,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct ExportLegacyArgs {
    #[command(flatten)]
    pub source: ZoneSource,

    /// Output format for errors: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct ImportLegacyArgs {
    /// Legacy record file (use - for stdin)
    #[arg(long)]
    pub input: String,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}
