use alloc::{string::String, string::ToString, vec::Vec};
use std::collections::HashMap;

use rstest::rstest;
use serde::Deserialize;

use crate::{
    Category, DeserializerOptions, Error, ErrorKind, GrammarError, LexError, Value, from_slice,
    from_str, from_str_with_options,
};

fn assert_err_contains(err: &Error, expected_sub: &str, line: usize, col: usize) {
    let s = err.to_string();
    assert!(s.contains(expected_sub), "expected substring {expected_sub:?} in {s:?}");
    assert_eq!(err.line(), line, "line of {s:?}");
    assert_eq!(err.column(), col, "column of {s:?}");
}

#[test]
fn error_empty_document() {
    let err = from_str::<Value>("").unwrap_err();
    assert_err_contains(&err, "unexpected end of input", 1, 1);
    assert_eq!(err.classify(), Category::Eof);
}

#[test]
fn error_whitespace_only_document() {
    let err = from_str::<Value>("  \n ").unwrap_err();
    assert_err_contains(&err, "unexpected end of input", 2, 2);
}

#[rstest]
#[case("/", "invalid character '/'", 1, 1)]
#[case("[1, @]", "invalid character '@'", 1, 5)]
#[case("{a:1}", "invalid character 'a'", 1, 2)]
#[case("-a", "invalid number", 1, 2)]
#[case("1ea", "invalid number", 1, 3)]
#[case("1.}", "invalid number", 1, 3)]
#[case("trux", "invalid literal", 1, 4)]
#[case("\"a\tb\"", "control character '\\t' in string", 1, 4)]
fn lexical_errors(
    #[case] input: &str,
    #[case] expected: &str,
    #[case] line: usize,
    #[case] col: usize,
) {
    let err = from_str::<Value>(input).unwrap_err();
    assert_err_contains(&err, expected, line, col);
    assert_eq!(err.classify(), Category::Lex);
}

#[rstest]
#[case(r#""\x""#, LexError::InvalidEscape(b'x'))]
#[case(r#""\u12""#, LexError::InvalidEscape(b'u'))]
#[case(r#""\udc00""#, LexError::InvalidUnicodeEscape(0xDC00))]
#[case(r#""\ud83d""#, LexError::InvalidUnicodeEscape(0xD83D))]
#[case(r#""\ud83dx""#, LexError::InvalidUnicodeEscape(0xD83D))]
fn bad_escapes_are_reported_at_the_string(#[case] input: &str, #[case] expected: LexError) {
    let err = from_str::<String>(input).unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::Lex(e) if *e == expected),
        "{err:?}"
    );
    assert_eq!((err.line(), err.column()), (1, 1));
}

#[test]
fn invalid_utf8_in_string() {
    let err = from_slice::<String>(b"\"\xff\"").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Lex(LexError::InvalidUtf8)));
}

#[rstest]
#[case("[1,2,]", "expected value", 1, 6)]
#[case(r#"{"a":1,}"#, "expected string key", 1, 8)]
#[case(r#"{"a" 1}"#, "expected colon", 1, 6)]
#[case(r#"{"a":1]"#, "expected comma", 1, 7)]
#[case("[1 2]", "expected comma", 1, 4)]
#[case("[,]", "expected value", 1, 2)]
#[case("]", "expected value", 1, 1)]
#[case("01", "trailing characters", 1, 2)]
#[case("1 2", "trailing characters", 1, 3)]
#[case("[] []", "trailing characters", 1, 4)]
#[case("{}\n\n  x", "invalid character 'x'", 3, 3)]
fn grammar_errors(
    #[case] input: &str,
    #[case] expected: &str,
    #[case] line: usize,
    #[case] col: usize,
) {
    let err = from_str::<Value>(input).unwrap_err();
    assert_err_contains(&err, expected, line, col);
}

#[rstest]
#[case("[1,", 1, 4)]
#[case(r#"{"a":"#, 1, 6)]
#[case(r#"{"a""#, 1, 5)]
#[case("[[]", 1, 4)]
#[case("1e", 1, 3)]
#[case("nul", 1, 4)]
fn truncated_documents(#[case] input: &str, #[case] line: usize, #[case] col: usize) {
    let err = from_str::<Value>(input).unwrap_err();
    assert_err_contains(&err, "unexpected end of input", line, col);
}

#[test]
fn unterminated_string() {
    let err = from_str::<Value>(r#"["abc"#).unwrap_err();
    assert_err_contains(&err, "unterminated string", 1, 6);
}

#[test]
fn type_mismatch_reports_both_sides() {
    let err = from_str::<u32>(r#""x""#).unwrap_err();
    assert_err_contains(&err, "invalid type: expected u32, found string", 1, 1);
    assert_eq!(err.classify(), Category::Data);

    let err = from_str::<Vec<bool>>("[true, null]").unwrap_err();
    assert_err_contains(&err, "expected a boolean, found null", 1, 8);

    let err = from_str::<String>("{}").unwrap_err();
    assert_err_contains(&err, "expected a string, found '{'", 1, 1);
}

#[test]
fn mismatch_inside_a_struct_points_at_the_field() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Record {
        id: u32,
    }

    let err = from_str::<Record>("{\n  \"id\": [1]\n}").unwrap_err();
    assert_err_contains(&err, "expected u32, found '['", 2, 9);
}

#[rstest]
#[case::too_wide("256", "number 256 out of range for u8")]
#[case::negative_into_unsigned("-1", "number -1 out of range for u8")]
fn numeric_range(#[case] input: &str, #[case] expected: &str) {
    let err = from_str::<u8>(input).unwrap_err();
    assert_err_contains(&err, expected, 1, 1);
    assert!(matches!(err.kind(), ErrorKind::NumericRange { target: "u8", .. }));
}

#[test]
fn fraction_into_integer_is_malformed() {
    let err = from_str::<i32>("1.5").unwrap_err();
    assert_err_contains(&err, "malformed number 1.5 for i32", 1, 1);
}

#[test]
fn float_overflow_is_out_of_range() {
    let err = from_str::<f64>("1e400").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NumericRange { target: "f64", .. }));
}

#[test]
fn negative_zero_into_unsigned_is_zero() {
    assert_eq!(from_str::<u16>("-0").unwrap(), 0);
}

#[test]
fn map_key_that_is_not_an_integer() {
    let err = from_str::<HashMap<u32, bool>>(r#"{"one": true}"#).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedNumber { target: "u32", .. }));
}

#[test]
fn depth_limit() {
    let options = DeserializerOptions {
        max_depth: Some(2),
        ..DeserializerOptions::default()
    };
    assert!(from_str_with_options::<Value>("[[1]]", options).is_ok());

    let err = from_str_with_options::<Value>("[[[1]]]", options).unwrap_err();
    assert_err_contains(&err, "nesting deeper than 2 levels", 1, 3);
    assert!(matches!(
        err.kind(),
        ErrorKind::Grammar(GrammarError::DepthLimitExceeded(2))
    ));
}
