//! Program model
//!
//! A program is an ordered list of [`Instruction`]s. Each instruction carries
//! its `order` (the unique key that defines execution sequence), an
//! [`Opcode`] and up to three decoded [`Arg`]s. Variable references are
//! parsed once into a [`VarRef`] so the VM never splits `"GF@x"` at runtime.

pub mod disasm;
pub mod literal;
pub mod opcode;
pub mod validator;

pub use disasm::{disassemble, format_instruction};
pub use opcode::{Opcode, OperandKind, UnknownOpcode};
pub use validator::{validate, ValidationError, ValidationErrorKind};

use crate::exit_codes;
use crate::value::{Value, ValueType};
use std::fmt;
use thiserror::Error;

/// Role of a variable frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameRole {
    /// Global frame (`GF`), lives for the whole run
    Global,
    /// Top of the local frame stack (`LF`)
    Local,
    /// Pending temporary frame (`TF`)
    Temporary,
}

impl FrameRole {
    pub fn prefix(self) -> &'static str {
        match self {
            FrameRole::Global => "GF",
            FrameRole::Local => "LF",
            FrameRole::Temporary => "TF",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameRole::Global),
            "LF" => Some(FrameRole::Local),
            "TF" => Some(FrameRole::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Reference to a variable: frame role plus name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub frame: FrameRole,
    pub name: String,
}

impl VarRef {
    pub fn new(frame: FrameRole, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    /// Parse `GF@name`, `LF@name` or `TF@name`
    pub fn parse(text: &str) -> Option<Self> {
        let (prefix, name) = text.split_once('@')?;
        let frame = FrameRole::from_prefix(prefix)?;
        literal::is_identifier(name).then(|| VarRef::new(frame, name))
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// Decoded instruction argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Var(VarRef),
    Literal(Value),
    Label(String),
    Type(ValueType),
}

impl Arg {
    /// Tag used by the XML interchange format
    pub fn tag(&self) -> &'static str {
        match self {
            Arg::Var(_) => "var",
            Arg::Literal(value) => value.type_name(),
            Arg::Label(_) => "label",
            Arg::Type(_) => "type",
        }
    }

    /// Whether this argument can stand in the given operand position
    pub fn fits(&self, kind: OperandKind) -> bool {
        match (kind, self) {
            (OperandKind::Var, Arg::Var(_)) => true,
            (OperandKind::Symb, Arg::Var(_) | Arg::Literal(_)) => true,
            (OperandKind::Label, Arg::Label(_)) => true,
            (OperandKind::Type, Arg::Type(ty)) => ty.is_readable(),
            _ => false,
        }
    }
}

/// Textual IPPcode22 operand syntax
impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Var(var) => write!(f, "{}", var),
            Arg::Literal(value) => f.write_str(&value.literal()),
            Arg::Label(name) => f.write_str(name),
            Arg::Type(ty) => f.write_str(ty.name()),
        }
    }
}

/// Single program instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Unique execution-order key
    pub order: u32,
    pub opcode: Opcode,
    pub args: Vec<Arg>,
}

impl Instruction {
    pub fn new(order: u32, opcode: Opcode, args: Vec<Arg>) -> Self {
        Self {
            order,
            opcode,
            args,
        }
    }
}

/// Errors raised while turning external input into a [`Program`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Input is not well-formed XML
    #[error("malformed XML: {0}")]
    MalformedXml(String),
    /// Well-formed input with an unexpected element, attribute or literal
    #[error("invalid program structure: {0}")]
    Structure(String),
    /// Two instructions share one order
    #[error("duplicate instruction order {0}")]
    DuplicateOrder(u32),
    /// Order zero (orders are positive)
    #[error("instruction order must be positive")]
    ZeroOrder,
    /// Operand count or kind does not match the opcode
    #[error("{}", summarize(.0))]
    Invalid(Vec<ValidationError>),
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "invalid instruction".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

impl LoadError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::MalformedXml(_) => exit_codes::MALFORMED_XML,
            LoadError::Structure(_)
            | LoadError::DuplicateOrder(_)
            | LoadError::ZeroOrder
            | LoadError::Invalid(_) => exit_codes::INVALID_STRUCTURE,
        }
    }
}

/// Validated program, instructions sorted by ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Sort by order, reject duplicate or zero orders, validate operand shapes
    pub fn new(mut instructions: Vec<Instruction>) -> Result<Self, LoadError> {
        instructions.sort_by_key(|instr| instr.order);

        if instructions.first().is_some_and(|instr| instr.order == 0) {
            return Err(LoadError::ZeroOrder);
        }
        if let Some(pair) = instructions
            .windows(2)
            .find(|pair| pair[0].order == pair[1].order)
        {
            return Err(LoadError::DuplicateOrder(pair[1].order));
        }

        validate(&instructions).map_err(LoadError::Invalid)?;
        Ok(Self { instructions })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
