//! Instruction shape validator, run before the VM sees a program
//!
//! Performs two checks per instruction:
//! 1. **Arity**: the argument count matches the opcode's operand list
//! 2. **Operand kinds**: every argument fits its position (`var`, `symb`,
//!    `label`, or a readable `type`)
//!
//! Everything else (labels, frames, types of values) is a runtime concern.

use super::{Instruction, OperandKind};
use std::fmt;

/// A validation error with the order of the offending instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub order: u32,
    pub kind: ValidationErrorKind,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instruction {}: {}", self.order, self.kind)
    }
}

/// Kinds of errors the validator can detect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Wrong number of arguments
    Arity {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },
    /// Argument at `position` (1-based) does not fit the operand kind
    Operand {
        opcode: &'static str,
        position: usize,
        expected: OperandKind,
        found: &'static str,
    },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity {
                opcode,
                expected,
                found,
            } => write!(
                f,
                "{} takes {} argument(s), found {}",
                opcode, expected, found
            ),
            Self::Operand {
                opcode,
                position,
                expected,
                found,
            } => write!(
                f,
                "{} argument {} must be {}, found {}",
                opcode, position, expected, found
            ),
        }
    }
}

/// Validate every instruction, collecting all errors found
///
/// Does NOT short-circuit on the first error.
pub fn validate(instructions: &[Instruction]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for instr in instructions {
        let expected = instr.opcode.operands();
        if expected.len() != instr.args.len() {
            errors.push(ValidationError {
                order: instr.order,
                kind: ValidationErrorKind::Arity {
                    opcode: instr.opcode.mnemonic(),
                    expected: expected.len(),
                    found: instr.args.len(),
                },
            });
            continue;
        }

        for (index, (kind, arg)) in expected.iter().zip(&instr.args).enumerate() {
            if !arg.fits(*kind) {
                errors.push(ValidationError {
                    order: instr.order,
                    kind: ValidationErrorKind::Operand {
                        opcode: instr.opcode.mnemonic(),
                        position: index + 1,
                        expected: *kind,
                        found: arg.tag(),
                    },
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
