use std::fmt;
use std::process::ExitCode;

use serde::Serialize;
use zoneinfo_core::{LegacyStage, ZoneError};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_INPUT_ERROR: u8 = 2;
pub const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Bad arguments or input lines versus failures while doing the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Runtime,
}

impl ErrorKind {
    fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Input => EXIT_INPUT_ERROR,
            ErrorKind::Runtime => EXIT_RUNTIME_ERROR,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    kind: ErrorKind,
    message: String,
    /// Set when a legacy record failed to decode.
    stage: Option<LegacyStage>,
}

impl CliError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CliError {
            kind,
            message: message.into(),
            stage: None,
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        CliError::new(ErrorKind::Input, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        CliError::new(ErrorKind::Runtime, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl From<ZoneError> for CliError {
    fn from(err: ZoneError) -> Self {
        let kind = match &err {
            ZoneError::NotFound(_) => ErrorKind::Input,
            _ => ErrorKind::Runtime,
        };
        let stage = match &err {
            ZoneError::LegacyFormat { stage, .. } => Some(*stage),
            _ => None,
        };
        CliError {
            stage,
            ..CliError::new(kind, err.to_string())
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
    exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
}

impl<'a> From<&'a CliError> for ErrorEnvelope<'a> {
    fn from(err: &'a CliError) -> Self {
        ErrorEnvelope {
            error: &err.message,
            exit_code: err.exit_code(),
            stage: err.stage.map(|stage| stage.to_string()),
        }
    }
}

pub fn render_error(err: &CliError, output_format: OutputFormat) -> ExitCode {
    match output_format {
        OutputFormat::Json => match serde_json::to_string_pretty(&ErrorEnvelope::from(err)) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("Error: {}", err),
        },
        OutputFormat::Text => eprintln!("Error: {}", err),
    }

    ExitCode::from(err.exit_code())
}

pub fn output_format_hint(s: &str) -> OutputFormat {
    if s.eq_ignore_ascii_case("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

pub fn parse_output_format(s: &str) -> CliResult<OutputFormat> {
    match s.to_lowercase().as_str() {
        "json" => Ok(OutputFormat::Json),
        "text" => Ok(OutputFormat::Text),
        _ => Err(CliError::input(format!(
            "Invalid output_format '{}'. Expected: json, text",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_errors_map_to_exit_codes() {
        let unknown = CliError::from(ZoneError::NotFound("Mars/Olympus".to_string()));
        assert_eq!(unknown.exit_code(), EXIT_INPUT_ERROR);
        assert_eq!(unknown.to_string(), "Unknown time zone: Mars/Olympus");
        assert_eq!(unknown.stage, None);

        let io = CliError::from(ZoneError::Io {
            zone: "Test/Zone".to_string(),
            source: std::io::Error::other("disk gone"),
        });
        assert_eq!(io.exit_code(), EXIT_RUNTIME_ERROR);
    }

    #[test]
    fn legacy_errors_carry_their_stage() {
        let err = CliError::from(ZoneError::LegacyFormat {
            stage: LegacyStage::TableReconstructed,
            message: "transition 2 refers to type 9".to_string(),
        });
        assert_eq!(err.exit_code(), EXIT_RUNTIME_ERROR);
        assert_eq!(err.stage, Some(LegacyStage::TableReconstructed));

        let envelope = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();
        assert_eq!(envelope["stage"], "table_reconstructed");
        assert_eq!(envelope["exit_code"], 3);
    }

    #[test]
    fn envelope_omits_stage_for_other_errors() {
        let err = CliError::input("Invalid format 'iso'");
        let envelope = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();
        assert!(envelope.get("stage").is_none());
        assert_eq!(envelope["error"], "Invalid format 'iso'");
    }
}
