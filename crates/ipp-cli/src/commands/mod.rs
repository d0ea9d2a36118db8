//! Subcommand implementations
//!
//! Each command returns the process exit code on a handled outcome and an
//! `anyhow` error for anything `main` should report.

pub mod check;
pub mod disasm;
pub mod parse;
pub mod run;

use crate::error::CliError;
use anyhow::{Context, Result};
use ipp_runtime::runtime::{self, SourceFormat};
use ipp_runtime::Program;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Program source shared by `run`, `check` and `disasm`
#[derive(Debug, Clone)]
pub struct SourceText {
    /// File name for messages, `<stdin>` when piped
    pub name: String,
    pub text: String,
    pub format: SourceFormat,
}

impl SourceText {
    /// Read from `path`, or from stdin when no path is given
    pub fn read(path: Option<&Path>, text_format: bool) -> Result<Self> {
        let format = if text_format {
            SourceFormat::Text
        } else {
            SourceFormat::Xml
        };
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| CliError::InputFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Self {
                    name: path.display().to_string(),
                    text,
                    format,
                })
            }
            None => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|source| CliError::InputFile {
                        path: "<stdin>".into(),
                        source,
                    })?;
                Ok(Self {
                    name: "<stdin>".to_string(),
                    text,
                    format,
                })
            }
        }
    }

    /// Parse into a validated program
    pub fn load(&self) -> Result<Program> {
        runtime::load(&self.text, self.format)
            .with_context(|| format!("failed to load {}", self.name))
    }
}
