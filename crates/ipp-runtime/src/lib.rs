//! IPP Runtime - IPPcode22 interpreter core
//!
//! This library provides:
//! - Program loading from the XML interchange format and IPPcode22 text
//! - Structural validation of instruction shapes
//! - A frame-based virtual machine with a call stack and a data stack
//! - Execution statistics and a disassembler

/// IPP runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod asm;
pub mod bytecode;
pub mod exit_codes;
pub mod io;
pub mod runtime;
pub mod value;
pub mod vm;
pub mod xml;

pub use asm::{assemble, AsmError};
pub use bytecode::{Arg, FrameRole, Instruction, LoadError, Opcode, Program, VarRef};
pub use runtime::{eval, EvalError, Outcome, SourceFormat};
pub use value::{RuntimeError, Value, ValueType};
pub use vm::{ExitStatus, Vm, VmConfig};
pub use xml::{load_xml, to_xml};
