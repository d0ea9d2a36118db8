//! Program loading: XML interchange, IPPcode22 text, instruction ordering

mod common;

use common::*;
use common::assert_eq;
use ipp_runtime::bytecode::disassemble;
use ipp_runtime::io::{string_reader, CaptureBuffer};
use ipp_runtime::runtime::{eval, load, SourceFormat};
use ipp_runtime::vm::VmConfig;
use ipp_runtime::{assemble, load_xml, to_xml};
use proptest::prelude::*;
use rstest::rstest;

fn xml_program(instructions: &[(u32, &str)]) -> String {
    let mut body = String::new();
    for (order, inner) in instructions {
        body.push_str(&format!("  <instruction order=\"{}\" {}\n", order, inner));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<program language=\"IPPcode22\">\n{}</program>\n",
        body
    )
}

fn write_int(n: i64) -> String {
    format!(
        "opcode=\"WRITE\"><arg1 type=\"int\">{}</arg1></instruction>",
        n
    )
}

fn run_xml(source: &str) -> (i32, String) {
    let out = CaptureBuffer::new();
    let config = VmConfig::new()
        .with_output(out.writer())
        .with_diagnostics(CaptureBuffer::new().writer())
        .with_input(string_reader(""));
    let code = match eval(source, SourceFormat::Xml, config) {
        Ok(outcome) => outcome.status.code(),
        Err(err) => err.exit_code(),
    };
    (code, out.contents())
}

#[test]
fn test_xml_end_to_end() {
    let source = xml_program(&[
        (1, r#"opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>"#),
        (2, r#"opcode="MOVE"><arg1 type="var">GF@x</arg1><arg2 type="int">5</arg2></instruction>"#),
        (3, r#"opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>"#),
    ]);
    assert_eq!(run_xml(&source), (0, "5".to_string()));
}

#[test]
fn test_execution_follows_order_not_document_position() {
    let source = xml_program(&[
        (30, write_int(3).as_str()),
        (10, write_int(1).as_str()),
        (20, write_int(2).as_str()),
    ]);
    assert_eq!(run_xml(&source), (0, "123".to_string()));
}

#[test]
fn test_orders_may_have_gaps() {
    let source = xml_program(&[(5, write_int(1).as_str()), (1000, write_int(2).as_str())]);
    assert_eq!(run_xml(&source), (0, "12".to_string()));
}

#[test]
fn test_labels_use_sorted_positions() {
    let source = xml_program(&[
        (40, r#"opcode="LABEL"><arg1 type="label">end</arg1></instruction>"#),
        (10, r#"opcode="JUMP"><arg1 type="label">end</arg1></instruction>"#),
        (20, write_int(1).as_str()),
        (50, write_int(2).as_str()),
    ]);
    assert_eq!(run_xml(&source), (0, "2".to_string()));
}

#[rstest]
#[case::not_xml("WRITE int@1", 31)]
#[case::unclosed("<program language=\"IPPcode22\">", 31)]
#[case::wrong_root("<prog language=\"IPPcode22\"/>", 32)]
#[case::wrong_language("<program language=\"IPPcode21\"/>", 32)]
#[case::missing_order("<program language=\"IPPcode22\"><instruction opcode=\"BREAK\"/></program>", 32)]
#[case::zero_order("<program language=\"IPPcode22\"><instruction order=\"0\" opcode=\"BREAK\"/></program>", 32)]
#[case::unknown_opcode("<program language=\"IPPcode22\"><instruction order=\"1\" opcode=\"NOP\"/></program>", 32)]
#[case::missing_arg("<program language=\"IPPcode22\"><instruction order=\"1\" opcode=\"WRITE\"/></program>", 32)]
fn test_xml_load_errors(#[case] source: &str, #[case] code: i32) {
    assert_eq!(run_xml(source).0, code);
}

#[test]
fn test_duplicate_order_is_32() {
    let source = xml_program(&[(1, write_int(1).as_str()), (1, write_int(2).as_str())]);
    assert_eq!(run_xml(&source), (32, String::new()));
}

#[test]
fn test_empty_xml_program() {
    let source = "<?xml version=\"1.0\"?><program language=\"ippcode22\"></program>";
    assert_eq!(run_xml(source), (0, String::new()));
}

#[test]
fn test_text_and_xml_load_the_same_program() {
    let text = ".IPPcode22\n\
                DEFVAR GF@s\n\
                MOVE GF@s string@a\\032b#c\n\
                LABEL top\n\
                JUMPIFEQ top GF@s nil@nil\n\
                READ GF@s bool\n";
    let from_text = assemble(text).unwrap();
    let from_xml = load_xml(&to_xml(&from_text)).unwrap();
    assert_eq!(from_xml, from_text);
    assert_eq!(
        disassemble(&from_xml),
        ".IPPcode22\n   1  DEFVAR GF@s\n   2  MOVE GF@s string@a\\032b\n   3  LABEL top\n   4  JUMPIFEQ top GF@s nil@nil\n   5  READ GF@s bool\n"
    );
}

#[rstest]
#[case::missing_header("WRITE int@1", 21)]
#[case::wrong_header(".IPPcode21\nWRITE int@1", 21)]
#[case::unknown_opcode(".IPPcode22\nPRINT int@1", 22)]
#[case::bad_literal(".IPPcode22\nWRITE int@1x", 23)]
#[case::too_many_operands(".IPPcode22\nRETURN int@1", 23)]
fn test_text_load_errors(#[case] source: &str, #[case] code: i32) {
    assert_eq!(load(source, SourceFormat::Text).unwrap_err().exit_code(), code);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_permuted_orders_execute_sorted(
        values in proptest::collection::vec(0i64..10, 1..8),
        seed in any::<u64>(),
    ) {
        // Orders 1..=n carry values in order; shuffle document position only.
        let mut entries: Vec<(u32, String)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1, write_int(*v)))
            .collect();
        let len = entries.len();
        for i in 0..len {
            let j = ((seed >> (i % 64)) as usize).wrapping_add(i * 7) % len;
            entries.swap(i, j);
        }
        let refs: Vec<(u32, &str)> = entries.iter().map(|(o, s)| (*o, s.as_str())).collect();

        let expected: String = values.iter().map(|v| v.to_string()).collect();
        prop_assert_eq!(run_xml(&xml_program(&refs)), (0, expected));
    }
}
