//! CLI failures and exit-code mapping

use ipp_runtime::exit_codes;
use ipp_runtime::{AsmError, EvalError, LoadError, RuntimeError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors owned by the command-line shell
#[derive(Debug, Error)]
pub enum CliError {
    #[error("at least one of --source or --input is required")]
    MissingStreams,
    #[error("cannot open input file '{}'", path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("test directory '{}' does not exist or is not a directory", path.display())]
    MissingDirectory { path: PathBuf },
    #[error("cannot open output file '{}'", path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::MissingStreams => exit_codes::INVALID_ARGUMENTS,
            CliError::InputFile { .. } => exit_codes::INPUT_FILE,
            CliError::OutputFile { .. } => exit_codes::OUTPUT_FILE,
            CliError::MissingDirectory { .. } => exit_codes::MISSING_PATH,
        }
    }
}

/// Exit code for any error that reached `main`
///
/// Walks the anyhow chain for a known error type; anything else is internal.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<EvalError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<LoadError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<AsmError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<RuntimeError>() {
            return e.exit_code();
        }
    }
    exit_codes::INTERNAL
}
