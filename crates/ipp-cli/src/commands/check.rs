//! Check command - load and validate a program without running it

use super::SourceText;
use anyhow::Result;
use colored::Colorize;
use ipp_runtime::asm::render_diagnostic;
use ipp_runtime::vm::LabelTable;
use ipp_runtime::{AsmError, EvalError, Program};
use serde_json::json;
use std::path::PathBuf;

/// Options for `ipp check`
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub source: Option<PathBuf>,
    pub text: bool,
    pub json: bool,
}

/// Everything a check can conclude
#[derive(Debug)]
enum Verdict {
    Ok { instructions: usize, labels: usize },
    Failed(EvalError),
}

fn analyze(source: &SourceText) -> Verdict {
    let program: Program = match ipp_runtime::runtime::load(&source.text, source.format) {
        Ok(program) => program,
        Err(err) => return Verdict::Failed(err),
    };
    match LabelTable::build(&program) {
        Ok(labels) => Verdict::Ok {
            instructions: program.len(),
            labels: labels.len(),
        },
        Err(err) => Verdict::Failed(err.into()),
    }
}

pub fn run(args: CheckArgs) -> Result<i32> {
    let source = SourceText::read(args.source.as_deref(), args.text)?;
    let verdict = analyze(&source);

    if args.json {
        let report = match &verdict {
            Verdict::Ok {
                instructions,
                labels,
            } => json!({
                "file": source.name,
                "ok": true,
                "instructions": instructions,
                "labels": labels,
            }),
            Verdict::Failed(err) => json!({
                "file": source.name,
                "ok": false,
                "exit_code": err.exit_code(),
                "error": err.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &verdict {
            Verdict::Ok {
                instructions,
                labels,
            } => println!(
                "{} {}: {} instruction(s), {} label(s)",
                "ok".green().bold(),
                source.name,
                instructions,
                labels
            ),
            Verdict::Failed(EvalError::Asm(err)) => {
                eprint!("{}", render_asm_error(&source, err));
            }
            Verdict::Failed(err) => {
                eprintln!("{}: {}: {}", "error".red().bold(), source.name, err);
            }
        }
    }

    Ok(match verdict {
        Verdict::Ok { .. } => 0,
        Verdict::Failed(err) => err.exit_code(),
    })
}

fn render_asm_error(source: &SourceText, err: &AsmError) -> String {
    render_diagnostic(&source.name, &source.text, err)
}
