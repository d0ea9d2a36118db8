//! Shared test utilities
//!
//! Programs are written as IPPcode22 text; the `.IPPcode22` header is added
//! by [`run_source`] so tests only carry the instructions they exercise.

#![allow(dead_code)]

use ipp_runtime::io::{string_reader, CaptureBuffer};
use ipp_runtime::runtime::{eval, SourceFormat};
use ipp_runtime::vm::VmConfig;

pub use pretty_assertions::{assert_eq, assert_ne};

/// Everything observable about one run
#[derive(Debug)]
pub struct RunResult {
    /// Process exit code
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run program text (without header) against the given input
pub fn run_with_input(body: &str, input: &str) -> RunResult {
    let stdout = CaptureBuffer::new();
    let stderr = CaptureBuffer::new();
    let config = VmConfig::new()
        .with_output(stdout.writer())
        .with_diagnostics(stderr.writer())
        .with_input(string_reader(input));

    let source = format!(".IPPcode22\n{}\n", body);
    let code = match eval(&source, SourceFormat::Text, config) {
        Ok(outcome) => outcome.status.code(),
        Err(err) => err.exit_code(),
    };
    RunResult {
        code,
        stdout: stdout.contents(),
        stderr: stderr.contents(),
    }
}

pub fn run_source(body: &str) -> RunResult {
    run_with_input(body, "")
}

/// Assert a clean run producing exactly `expected` on stdout
pub fn assert_output(body: &str, expected: &str) {
    let result = run_source(body);
    assert_eq!(
        result.code, 0,
        "program failed with {}: {}",
        result.code, result.stderr
    );
    assert_eq!(result.stdout, expected);
}

/// Assert the run ends with the given exit code
pub fn assert_exit_code(body: &str, expected: i32) {
    let result = run_source(body);
    assert_eq!(result.code, expected, "stdout: {:?}", result.stdout);
}

/// Evaluate an expression-producing instruction into `GF@r` and write it
///
/// `instr` uses `GF@r` as its destination.
pub fn eval_into_r(instr: &str) -> RunResult {
    run_source(&format!("DEFVAR GF@r\n{}\nWRITE GF@r", instr))
}
