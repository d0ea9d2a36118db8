//! IPPcode22 text front end
//!
//! Converts human-readable IPPcode22 source into a [`Program`].
//!
//! # Syntax
//!
//! ```text
//! .IPPcode22              # header, case-insensitive, required
//! DEFVAR GF@counter       # OPCODE operand operand ...
//! MOVE GF@counter int@0
//! WRITE string@hello\032world
//! ```
//!
//! - `#` starts a comment, blank lines are ignored
//! - opcodes are case-insensitive
//! - variables are `GF@`, `LF@` or `TF@` followed by an identifier
//! - constants are `int@…`, `bool@true|false`, `nil@nil`, `string@…`
//! - strings contain no whitespace or `#`; `\ddd` escapes any codepoint
//!
//! Instructions are numbered 1, 2, 3, … in source order.

use crate::bytecode::{literal, Arg, Instruction, Opcode, OperandKind, Program, VarRef};
use crate::exit_codes;
use crate::value::{Value, ValueType};
use std::fmt::Write;
use thiserror::Error;
use tracing::debug;

const COMMENT_CHAR: char = '#';
const HEADER: &str = ".IPPcode22";

/// Errors raised by the text front end
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    /// First significant line is not `.IPPcode22`
    #[error("line {line}: expected .IPPcode22 header")]
    MissingHeader { line: usize },
    /// Unrecognized mnemonic
    #[error("line {line}: unknown opcode '{mnemonic}'")]
    UnknownOpcode { line: usize, mnemonic: String },
    /// Lexically or syntactically invalid operand, wrong operand count
    #[error("line {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl AsmError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AsmError::MissingHeader { .. } => exit_codes::MISSING_HEADER,
            AsmError::UnknownOpcode { .. } => exit_codes::UNKNOWN_OPCODE,
            AsmError::Syntax { .. } => exit_codes::LEXICAL_OR_SYNTAX,
        }
    }

    /// Source line (1-based) the error points at
    pub fn line(&self) -> usize {
        match self {
            AsmError::MissingHeader { line }
            | AsmError::UnknownOpcode { line, .. }
            | AsmError::Syntax { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    /// 1-based column in the line
    column: usize,
}

/// Split a line into whitespace-separated tokens, dropping the comment
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let code = match line.find(COMMENT_CHAR) {
        Some(index) => &line[..index],
        None => line,
    };

    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (index, c) in code.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    text: &code[s..index],
                    column: s + 1,
                });
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &code[s..],
            column: s + 1,
        });
    }
    tokens
}

/// Assemble IPPcode22 source into a validated program
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();
    let mut has_header = false;

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let tokens = tokenize(line);
        let Some((head, operands)) = tokens.split_first() else {
            continue;
        };

        if !has_header {
            if operands.is_empty() && head.text.eq_ignore_ascii_case(HEADER) {
                has_header = true;
                continue;
            }
            return Err(AsmError::MissingHeader { line: line_no });
        }

        let opcode: Opcode = head.text.parse().map_err(|_| AsmError::UnknownOpcode {
            line: line_no,
            mnemonic: head.text.to_string(),
        })?;

        let expected = opcode.operands();
        if expected.len() != operands.len() {
            return Err(AsmError::Syntax {
                line: line_no,
                column: head.column,
                message: format!(
                    "{} takes {} operand(s), found {}",
                    opcode,
                    expected.len(),
                    operands.len()
                ),
            });
        }

        let args = expected
            .iter()
            .zip(operands)
            .map(|(kind, token)| parse_operand(*kind, token.text).ok_or_else(|| {
                AsmError::Syntax {
                    line: line_no,
                    column: token.column,
                    message: format!("invalid {} operand '{}'", kind, token.text),
                }
            }))
            .collect::<Result<Vec<_>, _>>()?;

        let order = u32::try_from(instructions.len() + 1).map_err(|_| AsmError::Syntax {
            line: line_no,
            column: head.column,
            message: "too many instructions".to_string(),
        })?;
        instructions.push(Instruction::new(order, opcode, args));
    }

    if !has_header {
        return Err(AsmError::MissingHeader {
            line: source.lines().count().max(1),
        });
    }

    debug!(instructions = instructions.len(), "assembled IPPcode22 source");
    // Operand shapes were checked above and orders are sequential, so the
    // program constructor cannot reject the list.
    Program::new(instructions).map_err(|e| AsmError::Syntax {
        line: 0,
        column: 0,
        message: e.to_string(),
    })
}

fn parse_operand(kind: OperandKind, text: &str) -> Option<Arg> {
    match kind {
        OperandKind::Var => VarRef::parse(text).map(Arg::Var),
        OperandKind::Symb => VarRef::parse(text)
            .map(Arg::Var)
            .or_else(|| parse_constant(text).map(Arg::Literal)),
        OperandKind::Label => literal::is_identifier(text).then(|| Arg::Label(text.to_string())),
        OperandKind::Type => ValueType::from_name(text)
            .filter(|ty| ty.is_readable())
            .map(Arg::Type),
    }
}

fn parse_constant(text: &str) -> Option<Value> {
    let (ty, body) = text.split_once('@')?;
    match ty {
        "int" => literal::parse_int(body).map(Value::Int),
        "bool" => match body {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        "nil" => (body == "nil").then_some(Value::Nil),
        "string" => literal::unescape(body).map(Value::Str),
        _ => None,
    }
}

/// Render a compiler-style diagnostic pointing at the offending line
pub fn render_diagnostic(file: &str, source: &str, err: &AsmError) -> String {
    let mut diag = String::new();
    let _ = writeln!(diag, "error: {}", err);
    let line = err.line();
    let column = match err {
        AsmError::Syntax { column, .. } => *column,
        _ => 1,
    };
    let _ = writeln!(diag, " --> {}:{}:{}", file, line, column);

    if let Some(raw_line) = source.lines().nth(line.saturating_sub(1)) {
        let underline = " ".repeat(column.saturating_sub(1));
        let _ = writeln!(diag, "  |");
        let _ = writeln!(diag, "{:>4} | {}", line, raw_line.trim_end_matches('\r'));
        let _ = writeln!(diag, "  | {}^", underline);
    }

    diag
}
