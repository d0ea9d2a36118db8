//! Arithmetic, relational, logical and string instructions

mod common;

use common::*;
use common::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

// ===== Arithmetic =====

#[rstest]
#[case("ADD GF@r int@2 int@3", "5")]
#[case("ADD GF@r int@-2 int@-3", "-5")]
#[case("SUB GF@r int@2 int@3", "-1")]
#[case("SUB GF@r int@-2 int@-3", "1")]
#[case("MUL GF@r int@-4 int@3", "-12")]
#[case("MUL GF@r int@0 int@-3", "0")]
#[case("IDIV GF@r int@5 int@2", "2")]
#[case("IDIV GF@r int@-5 int@2", "-3")]
#[case("IDIV GF@r int@5 int@-2", "-3")]
#[case("IDIV GF@r int@-5 int@-2", "2")]
#[case("IDIV GF@r int@6 int@3", "2")]
#[case("ADD GF@r int@9223372036854775806 int@1", "9223372036854775807")]
#[case("SUB GF@r int@-9223372036854775807 int@1", "-9223372036854775808")]
#[case("ADD GF@r int@0x10 int@0o10", "24")]
fn test_arithmetic(#[case] instr: &str, #[case] expected: &str) {
    let result = eval_into_r(instr);
    assert_eq!(result.code, 0, "{}", result.stderr);
    assert_eq!(result.stdout, expected);
}

#[rstest]
#[case::div_zero("IDIV GF@r int@5 int@0", 57)]
#[case::div_zero_negative("IDIV GF@r int@-5 int@0", 57)]
#[case::div_zero_zero("IDIV GF@r int@0 int@0", 57)]
#[case::overflow_add("ADD GF@r int@9223372036854775807 int@1", 57)]
#[case::overflow_mul("MUL GF@r int@9223372036854775807 int@2", 57)]
#[case::overflow_div("IDIV GF@r int@-9223372036854775808 int@-1", 57)]
#[case::string_operand("ADD GF@r int@1 string@1", 53)]
#[case::bool_operand("MUL GF@r bool@true int@1", 53)]
#[case::nil_operand("SUB GF@r nil@nil int@1", 53)]
#[case::string_divisor_zero_check_after_type("IDIV GF@r string@a int@0", 53)]
fn test_arithmetic_errors(#[case] instr: &str, #[case] code: i32) {
    assert_eq!(eval_into_r(instr).code, code);
}

// Both source operands are resolved before either is type checked, so a
// missing second operand wins over an ill-typed first one.
#[rstest]
#[case::add_undefined("ADD GF@r string@a GF@undef", 54)]
#[case::add_uninit("ADD GF@r string@a GF@u", 56)]
#[case::idiv_uninit("IDIV GF@r bool@true GF@u", 56)]
#[case::and_uninit("AND GF@r int@1 GF@u", 56)]
#[case::or_undefined("OR GF@r nil@nil GF@undef", 54)]
#[case::concat_uninit("CONCAT GF@r int@1 GF@u", 56)]
#[case::getchar_uninit("GETCHAR GF@r int@1 GF@u", 56)]
#[case::stri2int_uninit("STRI2INT GF@r int@1 GF@u", 56)]
#[case::setchar_uninit("SETCHAR GF@r string@x GF@u", 56)]
#[case::setchar_no_frame("SETCHAR GF@r string@x LF@s", 55)]
#[case::lt_uninit("LT GF@r nil@nil GF@u", 56)]
#[case::destination_checked_first("ADD GF@undef int@1 GF@u", 54)]
fn test_operands_resolved_before_type_check(#[case] instr: &str, #[case] code: i32) {
    assert_exit_code(
        &format!("DEFVAR GF@r\nMOVE GF@r string@abc\nDEFVAR GF@u\n{}", instr),
        code,
    );
}

#[test]
fn test_operands_may_alias_destination() {
    assert_output(
        "DEFVAR GF@x\nMOVE GF@x int@7\nMUL GF@x GF@x GF@x\nWRITE GF@x",
        "49",
    );
}

// ===== Relational =====

#[rstest]
#[case("LT GF@r int@1 int@2", "true")]
#[case("LT GF@r int@2 int@2", "false")]
#[case("GT GF@r int@-1 int@-2", "true")]
#[case("LT GF@r string@abc string@abd", "true")]
#[case("GT GF@r string@b string@abc", "true")]
#[case("LT GF@r string@ string@a", "true")]
#[case("LT GF@r bool@false bool@true", "true")]
#[case("GT GF@r bool@false bool@true", "false")]
#[case("EQ GF@r int@5 int@5", "true")]
#[case("EQ GF@r string@a string@b", "false")]
#[case("EQ GF@r bool@true bool@true", "true")]
#[case("EQ GF@r nil@nil nil@nil", "true")]
#[case("EQ GF@r nil@nil int@5", "false")]
#[case("EQ GF@r string@ nil@nil", "false")]
fn test_relational(#[case] instr: &str, #[case] expected: &str) {
    let result = eval_into_r(instr);
    assert_eq!(result.code, 0, "{}", result.stderr);
    assert_eq!(result.stdout, expected);
}

#[rstest]
#[case("EQ GF@r int@5 string@5")]
#[case("EQ GF@r bool@true int@1")]
#[case("LT GF@r nil@nil nil@nil")]
#[case("GT GF@r nil@nil int@1")]
#[case("LT GF@r int@1 string@1")]
fn test_relational_type_errors(#[case] instr: &str) {
    assert_eq!(eval_into_r(instr).code, 53);
}

// ===== Logical =====

#[rstest]
#[case("AND GF@r bool@true bool@true", "true")]
#[case("AND GF@r bool@true bool@false", "false")]
#[case("OR GF@r bool@false bool@true", "true")]
#[case("OR GF@r bool@false bool@false", "false")]
#[case("NOT GF@r bool@false", "true")]
#[case("NOT GF@r bool@true", "false")]
fn test_logical(#[case] instr: &str, #[case] expected: &str) {
    assert_eq!(eval_into_r(instr).stdout, expected);
}

#[rstest]
#[case("AND GF@r bool@true int@1")]
#[case("OR GF@r nil@nil bool@true")]
#[case("NOT GF@r string@true")]
fn test_logical_type_errors(#[case] instr: &str) {
    assert_eq!(eval_into_r(instr).code, 53);
}

// ===== Strings =====

#[rstest]
#[case("CONCAT GF@r string@ab string@cd", "abcd")]
#[case("CONCAT GF@r string@ string@", "")]
#[case("STRLEN GF@r string@žluťoučký", "9")]
#[case("STRLEN GF@r string@", "0")]
#[case("STRLEN GF@r string@a\\032b", "3")]
#[case("GETCHAR GF@r string@kůň int@1", "ů")]
#[case("STRI2INT GF@r string@A int@0", "65")]
#[case("STRI2INT GF@r string@aŘ int@1", "344")]
#[case("INT2CHAR GF@r int@97", "a")]
#[case("INT2CHAR GF@r int@0x1F600", "\u{1F600}")]
fn test_string_ops(#[case] instr: &str, #[case] expected: &str) {
    let result = eval_into_r(instr);
    assert_eq!(result.code, 0, "{}", result.stderr);
    assert_eq!(result.stdout, expected);
}

#[rstest]
#[case::getchar_past_end("GETCHAR GF@r string@abc int@3", 58)]
#[case::getchar_negative("GETCHAR GF@r string@abc int@-1", 58)]
#[case::getchar_empty("GETCHAR GF@r string@ int@0", 58)]
#[case::stri2int_past_end("STRI2INT GF@r string@a int@1", 58)]
#[case::int2char_negative("INT2CHAR GF@r int@-1", 58)]
#[case::int2char_surrogate("INT2CHAR GF@r int@55296", 58)]
#[case::int2char_too_large("INT2CHAR GF@r int@1114112", 58)]
#[case::concat_int("CONCAT GF@r string@a int@1", 53)]
#[case::strlen_int("STRLEN GF@r int@1", 53)]
#[case::getchar_index_type("GETCHAR GF@r string@a string@0", 53)]
#[case::int2char_string("INT2CHAR GF@r string@a", 53)]
fn test_string_errors(#[case] instr: &str, #[case] code: i32) {
    assert_eq!(eval_into_r(instr).code, code);
}

#[test]
fn test_setchar_replaces_one_codepoint() {
    assert_output(
        "DEFVAR GF@s\nMOVE GF@s string@čaj\nSETCHAR GF@s int@1 string@éxyz\nWRITE GF@s",
        "čéj",
    );
}

#[rstest]
#[case::out_of_range("MOVE GF@s string@abc\nSETCHAR GF@s int@3 string@x", 58)]
#[case::negative("MOVE GF@s string@abc\nSETCHAR GF@s int@-1 string@x", 58)]
#[case::empty_replacement("MOVE GF@s string@abc\nSETCHAR GF@s int@0 string@", 58)]
#[case::dest_not_string("MOVE GF@s int@1\nSETCHAR GF@s int@0 string@x", 53)]
#[case::index_not_int("MOVE GF@s string@abc\nSETCHAR GF@s bool@true string@x", 53)]
#[case::dest_uninitialized("SETCHAR GF@s int@0 string@x", 56)]
fn test_setchar_errors(#[case] setup: &str, #[case] code: i32) {
    let result = run_source(&format!("DEFVAR GF@s\n{}\nWRITE GF@s", setup));
    assert_eq!(result.code, code);
    assert_eq!(result.stdout, "");
}

#[test]
fn test_write_formats() {
    assert_output(
        "WRITE int@-0\nWRITE bool@false\nWRITE nil@nil\nWRITE string@tab\\009end",
        "0falsetab\tend",
    );
}

// ===== Properties =====

fn write_result(instr: &str) -> (i32, String) {
    let result = eval_into_r(instr);
    (result.code, result.stdout)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_add_matches_checked_add(a in any::<i64>(), b in any::<i64>()) {
        let (code, out) = write_result(&format!("ADD GF@r int@{} int@{}", a, b));
        match a.checked_add(b) {
            Some(sum) => {
                prop_assert_eq!(code, 0);
                prop_assert_eq!(out, sum.to_string());
            }
            None => {
                prop_assert_eq!(code, 57);
            }
        }
    }

    #[test]
    fn prop_idiv_is_floor_division(a in -10_000i64..10_000, b in -100i64..100) {
        let (code, out) = write_result(&format!("IDIV GF@r int@{} int@{}", a, b));
        if b == 0 {
            prop_assert_eq!(code, 57);
        } else {
            let expected = (a as f64 / b as f64).floor() as i64;
            prop_assert_eq!(code, 0);
            prop_assert_eq!(out, expected.to_string());
        }
    }

    #[test]
    fn prop_strlen_counts_codepoints(s in "[a-zá-ž]{0,16}") {
        let (code, out) = write_result(&format!("STRLEN GF@r string@{}", s));
        prop_assert_eq!(code, 0);
        prop_assert_eq!(out, s.chars().count().to_string());
    }

    #[test]
    fn prop_setchar_preserves_other_characters(s in "[a-zá-ž]{1,12}", idx in 0usize..12) {
        prop_assume!(idx < s.chars().count());
        let result = run_source(&format!(
            "DEFVAR GF@s\nMOVE GF@s string@{}\nSETCHAR GF@s int@{} string@X\nWRITE GF@s",
            s, idx
        ));
        let expected: String = s
            .chars()
            .enumerate()
            .map(|(i, c)| if i == idx { 'X' } else { c })
            .collect();
        prop_assert_eq!(result.code, 0);
        prop_assert_eq!(result.stdout, expected);
    }

    #[test]
    fn prop_int2char_stri2int_agree(c in any::<char>()) {
        let code = u32::from(c);
        let result = run_source(&format!(
            "DEFVAR GF@c\nDEFVAR GF@n\nINT2CHAR GF@c int@{}\nSTRI2INT GF@n GF@c int@0\nWRITE GF@n",
            code
        ));
        prop_assert_eq!(result.code, 0);
        prop_assert_eq!(result.stdout, code.to_string());
    }
}
