//! Disasm command - print a program listing

use super::SourceText;
use anyhow::Result;
use ipp_runtime::bytecode::disassemble;
use std::path::PathBuf;

pub fn run(source: Option<PathBuf>, text: bool) -> Result<i32> {
    let source = SourceText::read(source.as_deref(), text)?;
    let program = source.load()?;
    print!("{}", disassemble(&program));
    Ok(0)
}
