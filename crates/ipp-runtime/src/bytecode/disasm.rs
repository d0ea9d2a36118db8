//! Program disassembler
//!
//! Renders a loaded program back into IPPcode22 text, prefixed with each
//! instruction's order. Used by `ipp disasm` and by `BREAK`.

use super::{Instruction, Program};
use std::fmt::Write;

/// Disassemble a program to human-readable form
///
/// # Format
/// ```text
/// .IPPcode22
///    1  DEFVAR GF@x
///    2  MOVE GF@x int@5
///    3  WRITE GF@x
/// ```
pub fn disassemble(program: &Program) -> String {
    let mut output = String::from(".IPPcode22\n");
    for instr in program.instructions() {
        let _ = writeln!(output, "{}", format_instruction(instr));
    }
    output
}

/// Format one instruction as `order  OPCODE args…`
pub fn format_instruction(instr: &Instruction) -> String {
    let mut line = format!("{:>4}  {}", instr.order, instr.opcode);
    for arg in &instr.args {
        let _ = write!(line, " {}", arg);
    }
    line
}
