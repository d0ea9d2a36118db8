//! Run command - execute an IPPcode22 program

use super::SourceText;
use crate::error::CliError;
use anyhow::{Context, Result};
use ipp_runtime::io::{stdin_reader, InputReader};
use ipp_runtime::vm::{Stats, Vm, VmConfig};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use tracing::info;

/// Options for `ipp run`
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Program file; stdin when absent
    pub source: Option<PathBuf>,
    /// File read by `READ`; stdin when absent
    pub input: Option<PathBuf>,
    /// Where to write execution statistics
    pub stats: Option<PathBuf>,
    /// Statistics as JSON instead of text
    pub json: bool,
    /// Source is IPPcode22 text rather than XML
    pub text: bool,
}

/// Execute a program and return its exit code
pub fn run(args: RunArgs) -> Result<i32> {
    if args.source.is_none() && args.input.is_none() {
        return Err(CliError::MissingStreams.into());
    }

    let source = SourceText::read(args.source.as_deref(), args.text)?;
    let input = open_input(args.input.as_ref())?;
    let mut stats_file = args
        .stats
        .as_ref()
        .map(|path| {
            File::create(path).map_err(|source| CliError::OutputFile {
                path: path.clone(),
                source,
            })
        })
        .transpose()?;

    let program = source.load()?;
    info!(file = %source.name, instructions = program.len(), "program loaded");

    let config = VmConfig::new()
        .with_input(input)
        .with_profiling(stats_file.is_some());
    let mut vm =
        Vm::new(program, config).with_context(|| format!("cannot execute {}", source.name))?;
    let result = vm.run();

    if let (Some(file), Some(stats)) = (stats_file.as_mut(), vm.stats()) {
        write_stats(file, &stats, args.json).map_err(|source| CliError::OutputFile {
            path: args.stats.clone().unwrap_or_default(),
            source,
        })?;
    }

    let status = result.with_context(|| format!("runtime error in {}", source.name))?;
    Ok(status.code())
}

fn open_input(path: Option<&PathBuf>) -> Result<InputReader> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::InputFile {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(stdin_reader()),
    }
}

fn write_stats(file: &mut File, stats: &Stats, json: bool) -> std::io::Result<()> {
    let rendered = if json {
        let mut text = stats.to_json().map_err(std::io::Error::other)?;
        text.push('\n');
        text
    } else {
        stats.render()
    };
    file.write_all(rendered.as_bytes())?;
    file.flush()
}
