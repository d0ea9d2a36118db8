//! Runtime value representation
//!
//! - Int, Bool, Nil: immediate values
//! - Str: owned UTF-8 text, indexed by codepoint
//! - Uninit: state of a freshly defined variable; no instruction produces it
//!
//! Values are copied on assignment, so there is no aliasing between variables.

use crate::bytecode::{literal, FrameRole, Instruction, Opcode};
use crate::exit_codes;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Runtime type of an initialized value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Str,
    Bool,
    Nil,
}

impl ValueType {
    /// Name used by `TYPE`, `READ` and literal syntax
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Str => "string",
            ValueType::Bool => "bool",
            ValueType::Nil => "nil",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ValueType::Int),
            "string" => Some(ValueType::Str),
            "bool" => Some(ValueType::Bool),
            "nil" => Some(ValueType::Nil),
            _ => None,
        }
    }

    /// Types `READ` can produce from a line of input
    pub fn is_readable(self) -> bool {
        !matches!(self, ValueType::Nil)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Nil,
    #[default]
    Uninit,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Runtime type, `None` for an uninitialized slot
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Int(_) => Some(ValueType::Int),
            Value::Str(_) => Some(ValueType::Str),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Nil => Some(ValueType::Nil),
            Value::Uninit => None,
        }
    }

    /// Type name as reported by `TYPE` (empty for an uninitialized slot)
    pub fn type_name(&self) -> &'static str {
        self.value_type().map_or("", ValueType::name)
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self, Value::Uninit)
    }

    /// Literal syntax (`int@5`, `string@a\032b`, `nil@nil`)
    pub fn literal(&self) -> String {
        match self {
            Value::Int(n) => format!("int@{}", n),
            Value::Str(s) => format!("string@{}", literal::escape(s)),
            Value::Bool(b) => format!("bool@{}", b),
            Value::Nil => "nil@nil".to_string(),
            Value::Uninit => "<uninitialized>".to_string(),
        }
    }

    /// Equality used by `EQ`, `JUMPIFEQ` and `JUMPIFNEQ`
    ///
    /// `nil` compares to anything (equal only to `nil`); other values must
    /// share a type.
    pub fn equals(&self, other: &Value) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ok(true),
            (Value::Nil, v) | (v, Value::Nil) if v.is_initialized() => Ok(false),
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            _ => Err(mismatch("compare", self, other)),
        }
    }

    /// Ordering used by `LT` and `GT`; `nil` is not ordered
    pub fn compare(&self, other: &Value) -> Result<Ordering, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            _ => Err(mismatch("order", self, other)),
        }
    }
}

fn mismatch(action: &str, a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::TypeIncompatible {
        msg: format!(
            "cannot {} {} with {}",
            action,
            type_label(a),
            type_label(b)
        ),
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Uninit => "uninitialized value",
        other => other.type_name(),
    }
}

/// Text written by `WRITE`; nil prints nothing
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil | Value::Uninit => Ok(()),
        }
    }
}

/// Runtime errors
///
/// Every variant maps to exactly one reserved exit code. The message carries
/// diagnostic detail only; callers should act on [`RuntimeError::exit_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Redefined variable, undefined or duplicate label
    #[error("semantic error: {msg}")]
    Semantics { msg: String },
    /// Operand types do not fit the instruction
    #[error("type error: {msg}")]
    TypeIncompatible { msg: String },
    /// Variable absent from an existing frame
    #[error("undefined variable {name}")]
    UndefinedVariable { name: String },
    /// `LF` with an empty frame stack, or `TF` with no pending frame
    #[error("frame {frame} does not exist")]
    FrameNonexistent { frame: FrameRole },
    /// Uninitialized read, empty data stack, empty call stack
    #[error("missing value: {msg}")]
    MissingValue { msg: String },
    /// Division by zero, exit code out of range, integer overflow
    #[error("invalid operand: {msg}")]
    InvalidOperand { msg: String },
    /// String index out of range, invalid codepoint
    #[error("string error: {msg}")]
    StringManipulation { msg: String },
    /// Instruction shape the validator should have rejected
    #[error("malformed instruction: {msg}")]
    Malformed { msg: String },
    /// Reading input or writing output failed
    #[error("I/O error: {message}")]
    Io { message: String },
    /// Error annotated with the instruction that raised it
    #[error("instruction {order} ({opcode}): {source}")]
    Trapped {
        order: u32,
        opcode: Opcode,
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Semantics { .. } => exit_codes::SEMANTICS,
            RuntimeError::TypeIncompatible { .. } => exit_codes::TYPE_INCOMPATIBLE,
            RuntimeError::UndefinedVariable { .. } => exit_codes::UNDEFINED_VARIABLE,
            RuntimeError::FrameNonexistent { .. } => exit_codes::FRAME_NONEXISTENT,
            RuntimeError::MissingValue { .. } => exit_codes::MISSING_VALUE,
            RuntimeError::InvalidOperand { .. } => exit_codes::INVALID_OPERAND,
            RuntimeError::StringManipulation { .. } => exit_codes::STRING_MANIPULATION,
            RuntimeError::Malformed { .. } => exit_codes::INVALID_STRUCTURE,
            RuntimeError::Io { .. } => exit_codes::INTERNAL,
            RuntimeError::Trapped { source, .. } => source.exit_code(),
        }
    }

    /// Attach the failing instruction; already-trapped errors are kept as is
    pub fn trapped(self, instr: &Instruction) -> Self {
        match self {
            RuntimeError::Trapped { .. } => self,
            other => RuntimeError::Trapped {
                order: instr.order,
                opcode: instr.opcode,
                source: Box::new(other),
            },
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io {
            message: err.to_string(),
        }
    }
}
