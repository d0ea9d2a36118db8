//! Parse command - translate IPPcode22 text into the XML interchange format

use crate::error::CliError;
use anyhow::{Context, Result};
use ipp_runtime::asm::{assemble, render_diagnostic};
use ipp_runtime::to_xml;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Options for `ipp parse`
#[derive(Debug, Clone, Default)]
pub struct ParseArgs {
    /// IPPcode22 source; stdin when absent
    pub file: Option<PathBuf>,
    /// XML destination; stdout when absent
    pub output: Option<PathBuf>,
}

pub fn run(args: ParseArgs) -> Result<i32> {
    let (name, source) = match &args.file {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CliError::InputFile {
                path: path.clone(),
                source,
            })?;
            (path.display().to_string(), text)
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::InputFile {
                    path: "<stdin>".into(),
                    source,
                })?;
            ("<stdin>".to_string(), text)
        }
    };

    let program = match assemble(&source) {
        Ok(program) => program,
        Err(err) => {
            eprint!("{}", render_diagnostic(&name, &source, &err));
            return Ok(err.exit_code());
        }
    };
    let xml = to_xml(&program);

    match &args.output {
        Some(path) => fs::write(path, xml).map_err(|source| CliError::OutputFile {
            path: path.clone(),
            source,
        })?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(xml.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write XML to stdout")?;
        }
    }
    Ok(0)
}
