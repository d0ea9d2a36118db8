//! Process exit code registry
//!
//! Ranges:
//! - 0-49: normal completion or a program-requested `EXIT`
//! - 1x: command-line and stream errors (owned by the CLI)
//! - 2x: textual IPPcode22 front end
//! - 3x: XML interchange format
//! - 41: missing test directory (owned by `ipp test`)
//! - 5x: runtime errors raised by the VM
//! - 99: internal errors

pub const OK: i32 = 0;

// 1x - command line
pub const INVALID_ARGUMENTS: i32 = 10;
pub const INPUT_FILE: i32 = 11;
pub const OUTPUT_FILE: i32 = 12;

// 2x - IPPcode22 text
pub const MISSING_HEADER: i32 = 21;
pub const UNKNOWN_OPCODE: i32 = 22;
pub const LEXICAL_OR_SYNTAX: i32 = 23;

// 3x - XML
pub const MALFORMED_XML: i32 = 31;
pub const INVALID_STRUCTURE: i32 = 32;

// 4x - test runner
pub const MISSING_PATH: i32 = 41;

// 5x - runtime
pub const SEMANTICS: i32 = 52;
pub const TYPE_INCOMPATIBLE: i32 = 53;
pub const UNDEFINED_VARIABLE: i32 = 54;
pub const FRAME_NONEXISTENT: i32 = 55;
pub const MISSING_VALUE: i32 = 56;
pub const INVALID_OPERAND: i32 = 57;
pub const STRING_MANIPULATION: i32 = 58;

pub const INTERNAL: i32 = 99;

/// Highest code a program may pass to `EXIT`
pub const MAX_PROGRAM_EXIT: i64 = 49;

/// Short description for a reserved exit code
pub fn describe(code: i32) -> &'static str {
    match code {
        OK => "success",
        INVALID_ARGUMENTS => "invalid command-line arguments",
        INPUT_FILE => "cannot open input file",
        OUTPUT_FILE => "cannot open output file",
        MISSING_PATH => "missing file or directory",
        MISSING_HEADER => "missing or invalid header",
        UNKNOWN_OPCODE => "unknown opcode",
        LEXICAL_OR_SYNTAX => "lexical or syntax error",
        MALFORMED_XML => "malformed XML",
        INVALID_STRUCTURE => "invalid program structure",
        SEMANTICS => "semantic error",
        TYPE_INCOMPATIBLE => "incompatible operand types",
        UNDEFINED_VARIABLE => "undefined variable",
        FRAME_NONEXISTENT => "frame does not exist",
        MISSING_VALUE => "missing value",
        INVALID_OPERAND => "invalid operand value",
        STRING_MANIPULATION => "invalid string operation",
        INTERNAL => "internal error",
        1..=49 => "program exit",
        _ => "unknown",
    }
}
