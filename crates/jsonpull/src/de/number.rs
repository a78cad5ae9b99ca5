//! Typed parsing of number lexemes.
//!
//! The scanner guarantees that a number token matches the JSON number
//! grammar, so every lexeme here is ASCII. What remains is choosing a Rust
//! type and mapping the standard library's parse failures onto
//! [`ErrorKind::NumericRange`] and [`ErrorKind::MalformedNumber`].

use core::{
    num::{IntErrorKind, ParseIntError},
    str::FromStr,
};

use bstr::BString;

use crate::{error::ErrorKind, options::NumberInference};

/// A number classified for `deserialize_any`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Inferred {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// `true` if the lexeme has a fraction or an exponent.
pub(crate) fn is_float_lexeme(lexeme: &[u8]) -> bool {
    lexeme.iter().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

pub(crate) fn infer(lexeme: &[u8], mode: NumberInference) -> Result<Inferred, ErrorKind> {
    let integer = if mode == NumberInference::Lexical && is_float_lexeme(lexeme) {
        None
    } else if lexeme.first() == Some(&b'-') {
        parse_int::<i64>(lexeme).ok().map(Inferred::Signed)
    } else {
        parse_int::<u64>(lexeme).ok().map(Inferred::Unsigned)
    };
    match integer {
        Some(n) => Ok(n),
        None => parse_float::<f64>(lexeme).map(Inferred::Float),
    }
}

/// Integer widths the dispatcher can parse into.
pub(crate) trait Integer: FromStr<Err = ParseIntError> {
    const NAME: &'static str;
    const SIGNED: bool;
}

macro_rules! integer {
    ($($ty:ty => $signed:literal),* $(,)?) => {$(
        impl Integer for $ty {
            const NAME: &'static str = stringify!($ty);
            const SIGNED: bool = $signed;
        }
    )*};
}

integer! {
    i8 => true, i16 => true, i32 => true, i64 => true, i128 => true,
    u8 => false, u16 => false, u32 => false, u64 => false, u128 => false,
}

pub(crate) fn parse_int<T: Integer>(lexeme: &[u8]) -> Result<T, ErrorKind> {
    let text = core::str::from_utf8(lexeme).map_err(|_| malformed(T::NAME, lexeme))?;
    // `-0` is zero for every width.
    let text = if !T::SIGNED && text == "-0" { "0" } else { text };
    match text.parse::<T>() {
        Ok(n) => Ok(n),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(range(T::NAME, lexeme)),
            IntErrorKind::InvalidDigit
                if !T::SIGNED && text.starts_with('-') && !is_float_lexeme(lexeme) =>
            {
                Err(range(T::NAME, lexeme))
            }
            _ => Err(malformed(T::NAME, lexeme)),
        },
    }
}

/// Float widths the dispatcher can parse into.
pub(crate) trait Float: FromStr {
    const NAME: &'static str;
    fn is_finite(&self) -> bool;
}

impl Float for f32 {
    const NAME: &'static str = "f32";
    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Float for f64 {
    const NAME: &'static str = "f64";
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

pub(crate) fn parse_float<T: Float>(lexeme: &[u8]) -> Result<T, ErrorKind> {
    let text = core::str::from_utf8(lexeme).map_err(|_| malformed(T::NAME, lexeme))?;
    match text.parse::<T>() {
        Ok(n) if n.is_finite() => Ok(n),
        Ok(_) => Err(range(T::NAME, lexeme)),
        Err(_) => Err(malformed(T::NAME, lexeme)),
    }
}

fn range(target: &'static str, lexeme: &[u8]) -> ErrorKind {
    ErrorKind::NumericRange {
        target,
        literal: BString::from(lexeme),
    }
}

fn malformed(target: &'static str, lexeme: &[u8]) -> ErrorKind {
    ErrorKind::MalformedNumber {
        target,
        literal: BString::from(lexeme),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", Inferred::Unsigned(0))]
    #[case("18446744073709551615", Inferred::Unsigned(u64::MAX))]
    #[case("-7", Inferred::Signed(-7))]
    #[case("1.5", Inferred::Float(1.5))]
    #[case("1e3", Inferred::Float(1000.0))]
    #[case("-2E-1", Inferred::Float(-0.2))]
    #[case("18446744073709551616", Inferred::Float(18_446_744_073_709_551_616.0))]
    #[case("-9223372036854775809", Inferred::Float(-9_223_372_036_854_775_809.0))]
    fn lexical_inference(#[case] lexeme: &str, #[case] expected: Inferred) {
        assert_eq!(
            infer(lexeme.as_bytes(), NumberInference::Lexical).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case("12", Inferred::Unsigned(12))]
    #[case("-12", Inferred::Signed(-12))]
    #[case("1.25", Inferred::Float(1.25))]
    #[case("-1e2", Inferred::Float(-100.0))]
    fn sign_only_inference_falls_back_to_float(
        #[case] lexeme: &str,
        #[case] expected: Inferred,
    ) {
        assert_eq!(
            infer(lexeme.as_bytes(), NumberInference::SignOnly).unwrap(),
            expected
        );
    }

    #[test]
    fn integer_parse_errors() {
        assert!(matches!(
            parse_int::<u8>(b"256"),
            Err(ErrorKind::NumericRange { target: "u8", .. })
        ));
        assert!(matches!(
            parse_int::<i8>(b"-129"),
            Err(ErrorKind::NumericRange { target: "i8", .. })
        ));
        assert!(matches!(
            parse_int::<u32>(b"-1"),
            Err(ErrorKind::NumericRange { target: "u32", .. })
        ));
        assert!(matches!(
            parse_int::<i32>(b"1.5"),
            Err(ErrorKind::MalformedNumber { target: "i32", .. })
        ));
        assert!(matches!(
            parse_int::<u16>(b"-1.5"),
            Err(ErrorKind::MalformedNumber { target: "u16", .. })
        ));
        assert_eq!(parse_int::<u64>(b"-0").unwrap(), 0);
        assert_eq!(parse_int::<i128>(b"-170141183460469231731687303715884105728").unwrap(), i128::MIN);
    }

    #[test]
    fn float_overflow_is_range_error() {
        assert!(matches!(
            parse_float::<f32>(b"1e39"),
            Err(ErrorKind::NumericRange { target: "f32", .. })
        ));
        assert!(matches!(
            parse_float::<f64>(b"1e400"),
            Err(ErrorKind::NumericRange { target: "f64", .. })
        ));
        assert!((parse_float::<f64>(b"-0.5").unwrap() + 0.5).abs() < f64::EPSILON);
    }
}
