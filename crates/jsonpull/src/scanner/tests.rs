use alloc::{string::String, vec::Vec};

use rstest::rstest;

use super::*;
use crate::read::SliceSource;

fn scan_all(input: &str) -> Result<Vec<(TokenKind, String)>> {
    let mut scanner = Scanner::new(SliceSource::new(input.as_bytes()));
    let mut out = Vec::new();
    while let Some(tok) = scanner.next_raw_token()? {
        out.push((tok.kind, String::from_utf8_lossy(tok.bytes).into_owned()));
    }
    Ok(out)
}

fn kinds(input: &str) -> Vec<TokenKind> {
    scan_all(input)
        .unwrap()
        .into_iter()
        .map(|(kind, _)| kind)
        .collect()
}

#[test]
fn punctuation_and_whitespace() {
    use TokenKind::*;
    assert_eq!(
        kinds(" {\t}\n[\r] : , "),
        [ObjectOpen, ObjectClose, ArrayOpen, ArrayClose, Colon, Comma]
    );
}

#[test]
fn string_keeps_quotes_and_escapes_verbatim() {
    let toks = scan_all(r#""a\"b\\" "A""#).unwrap();
    assert_eq!(toks[0], (TokenKind::String, String::from(r#""a\"b\\""#)));
    assert_eq!(toks[1], (TokenKind::String, String::from(r#""A""#)));
}

#[rstest]
#[case("0")]
#[case("-0")]
#[case("123")]
#[case("-112323")]
#[case("3.25")]
#[case("1e10")]
#[case("1E+2")]
#[case("-2.5e-3")]
fn numbers_are_single_tokens(#[case] input: &str) {
    let toks = scan_all(input).unwrap();
    assert_eq!(toks, [(TokenKind::Number, String::from(input))]);
}

#[test]
fn number_takes_longest_prefix() {
    // `01` is a zero followed by another number; rejecting that is the
    // state machine's business.
    let toks = scan_all("01").unwrap();
    assert_eq!(
        toks,
        [
            (TokenKind::Number, String::from("0")),
            (TokenKind::Number, String::from("1"))
        ]
    );
}

#[test]
fn number_stops_at_delimiter() {
    let toks = scan_all("[12,3]").unwrap();
    assert_eq!(toks[1], (TokenKind::Number, String::from("12")));
    assert_eq!(toks[3], (TokenKind::Number, String::from("3")));
}

#[test]
fn keywords() {
    use TokenKind::*;
    assert_eq!(kinds("true false null"), [True, False, Null]);
}

#[rstest]
#[case("-a", LexError::InvalidNumber)]
#[case("1.x", LexError::InvalidNumber)]
#[case("1e+x", LexError::InvalidNumber)]
#[case("nul!", LexError::InvalidLiteral)]
#[case("tru e", LexError::InvalidLiteral)]
#[case("\"abc", LexError::UnterminatedString)]
#[case("\"abc\\", LexError::UnterminatedString)]
#[case("\"a\nb\"", LexError::ControlCharacter(b'\n'))]
#[case("a", LexError::InvalidByte(b'a'))]
#[case("'x'", LexError::InvalidByte(b'\''))]
fn lex_errors(#[case] input: &str, #[case] expected: LexError) {
    let err = scan_all(input).unwrap_err();
    match err.kind() {
        ErrorKind::Lex(found) => assert_eq!(found, &expected),
        other => panic!("expected lex error, got {other:?}"),
    }
}

#[rstest]
#[case("-")]
#[case("1.")]
#[case("tr")]
fn truncated_tokens_are_unexpected_eof(#[case] input: &str) {
    let err = scan_all(input).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnexpectedEndOfInput));
}

#[test]
fn end_of_input_is_distinct_from_tokens() {
    let mut scanner = Scanner::new(SliceSource::new(b"  "));
    assert!(scanner.next_raw_token().unwrap().is_none());
    assert!(scanner.next_raw_token().unwrap().is_none());
    assert_eq!(scanner.tokens_scanned(), 0);
}

#[test]
fn tracks_token_start() {
    let mut scanner = Scanner::new(SliceSource::new(b"\n  true"));
    scanner.next_raw_token().unwrap();
    let start = scanner.token_start();
    assert_eq!((start.line, start.column), (2, 3));
    assert_eq!(scanner.tokens_scanned(), 1);
}

#[test]
fn lexeme_is_reused_between_tokens() {
    let mut scanner = Scanner::new(SliceSource::new(br#""long string" 1"#));
    scanner.next_raw_token().unwrap();
    assert_eq!(scanner.lexeme(), br#""long string""#);
    scanner.next_raw_token().unwrap();
    assert_eq!(scanner.lexeme(), b"1");
}
