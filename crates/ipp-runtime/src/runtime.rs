//! Embedding API
//!
//! Loads a program from either source format and runs it to completion.
//!
//! ```
//! use ipp_runtime::io::CaptureBuffer;
//! use ipp_runtime::runtime::{eval, SourceFormat};
//! use ipp_runtime::vm::{ExitStatus, VmConfig};
//!
//! let out = CaptureBuffer::new();
//! let config = VmConfig::new().with_output(out.writer());
//! let outcome = eval(".IPPcode22\nWRITE string@hi\n", SourceFormat::Text, config).unwrap();
//! assert_eq!(outcome.status, ExitStatus::Completed);
//! assert_eq!(out.contents(), "hi");
//! ```

use crate::asm::{self, AsmError};
use crate::bytecode::{LoadError, Program};
use crate::value::RuntimeError;
use crate::vm::{ExitStatus, Stats, Vm, VmConfig};
use crate::xml;
use thiserror::Error;

/// Program source encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// XML interchange format
    #[default]
    Xml,
    /// IPPcode22 text
    Text,
}

/// Any failure between source text and a finished run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Asm(#[from] AsmError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl EvalError {
    pub fn exit_code(&self) -> i32 {
        match self {
            EvalError::Load(e) => e.exit_code(),
            EvalError::Asm(e) => e.exit_code(),
            EvalError::Runtime(e) => e.exit_code(),
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: ExitStatus,
    /// Present when profiling was enabled
    pub stats: Option<Stats>,
}

/// Parse source in the given format
pub fn load(source: &str, format: SourceFormat) -> Result<Program, EvalError> {
    Ok(match format {
        SourceFormat::Xml => xml::load_xml(source)?,
        SourceFormat::Text => asm::assemble(source)?,
    })
}

/// Load and run a program
pub fn eval(source: &str, format: SourceFormat, config: VmConfig) -> Result<Outcome, EvalError> {
    let program = load(source, format)?;
    run(program, config)
}

/// Run an already loaded program
pub fn run(program: Program, config: VmConfig) -> Result<Outcome, EvalError> {
    let mut vm = Vm::new(program, config)?;
    let status = vm.run()?;
    Ok(Outcome {
        status,
        stats: vm.stats(),
    })
}
