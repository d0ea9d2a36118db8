//! Frame-based virtual machine
//!
//! Executes a loaded [`Program`] instruction by instruction:
//! - `pc` indexes the order-sorted instruction list
//! - variables live in a [`FrameStore`] (GF, LF stack, pending TF)
//! - `CALL`/`RETURN` use a separate call stack of return addresses
//! - `PUSHS`/`POPS` use a data stack of resolved values
//!
//! Errors are fatal. The first one stops the run, is annotated with the
//! failing instruction and is returned to the caller; no partial write of
//! the failing instruction is ever visible.

mod dispatch;
mod frame;
mod labels;
mod profiler;

pub use frame::{Frame, FrameStore};
pub use labels::LabelTable;
pub use profiler::{OpcodeCount, Profiler, Stats};

use crate::bytecode::Program;
use crate::io::{self, InputReader, OutputWriter};
use crate::value::{RuntimeError, Value};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// How a completed run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Ran past the last instruction
    Completed,
    /// `EXIT` with a code in 0..=49
    Exit(u8),
}

impl ExitStatus {
    /// Process exit code
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Completed => 0,
            ExitStatus::Exit(code) => i32::from(code),
        }
    }
}

/// Streams and options for a VM instance
pub struct VmConfig {
    output: OutputWriter,
    diagnostics: OutputWriter,
    input: InputReader,
    profiling: bool,
}

impl VmConfig {
    /// stdout, stderr and stdin; profiling off
    pub fn new() -> Self {
        Self {
            output: io::stdout_writer(),
            diagnostics: io::stderr_writer(),
            input: io::stdin_reader(),
            profiling: false,
        }
    }

    /// Sink for `WRITE`
    pub fn with_output(mut self, output: OutputWriter) -> Self {
        self.output = output;
        self
    }

    /// Sink for `DPRINT` and `BREAK`
    pub fn with_diagnostics(mut self, diagnostics: OutputWriter) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Source for `READ`
    pub fn with_input(mut self, input: InputReader) -> Self {
        self.input = input;
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual machine state
pub struct Vm {
    program: Arc<Program>,
    labels: LabelTable,
    frames: FrameStore,
    /// Return addresses pushed by `CALL`
    call_stack: Vec<usize>,
    /// Values pushed by `PUSHS`
    data_stack: Vec<Value>,
    /// Index of the next instruction
    pc: usize,
    /// Executed instructions, meta instructions excluded
    executed: u64,
    output: OutputWriter,
    diagnostics: OutputWriter,
    input: InputReader,
    profiler: Option<Profiler>,
}

/// Result of executing one instruction
pub(crate) enum Flow {
    Continue,
    Exit(u8),
}

impl Vm {
    /// Prepare a program for execution
    ///
    /// Runs the label pre-pass, so a duplicate label fails here before any
    /// instruction executes.
    pub fn new(program: Program, config: VmConfig) -> Result<Self, RuntimeError> {
        let labels = LabelTable::build(&program)?;
        Ok(Self {
            program: Arc::new(program),
            labels,
            frames: FrameStore::new(),
            call_stack: Vec::new(),
            data_stack: Vec::new(),
            pc: 0,
            executed: 0,
            output: config.output,
            diagnostics: config.diagnostics,
            input: config.input,
            profiler: config.profiling.then(Profiler::new),
        })
    }

    /// Execute until the program ends, `EXIT` runs, or an error occurs
    ///
    /// Program output is flushed on every path out of the loop.
    pub fn run(&mut self) -> Result<ExitStatus, RuntimeError> {
        debug!(
            instructions = self.program.len(),
            labels = self.labels.len(),
            "starting execution"
        );
        let result = self.execute_loop();
        let flushed = io::flush(&self.output);

        match result {
            Ok(status) => {
                flushed?;
                debug!(code = status.code(), executed = self.executed, "execution finished");
                Ok(status)
            }
            Err(err) => {
                warn!(code = err.exit_code(), "{}", err);
                Err(err)
            }
        }
    }

    fn execute_loop(&mut self) -> Result<ExitStatus, RuntimeError> {
        let program = Arc::clone(&self.program);
        while let Some(instr) = program.get(self.pc) {
            self.pc += 1;
            trace!(order = instr.order, opcode = %instr.opcode, "execute");

            let flow = self.execute(instr).map_err(|err| err.trapped(instr))?;

            if !instr.opcode.is_meta() {
                self.executed += 1;
            }
            if let Some(ref mut profiler) = self.profiler {
                profiler.record_instruction(instr);
                profiler.update_initialized(self.frames.initialized_count());
            }

            if let Flow::Exit(code) = flow {
                return Ok(ExitStatus::Exit(code));
            }
        }
        Ok(ExitStatus::Completed)
    }

    /// Statistics, when profiling is enabled
    pub fn stats(&self) -> Option<Stats> {
        self.profiler.as_ref().map(Profiler::stats)
    }
}
