#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use jsonpull::{DeserializerOptions, NumberInference, Value, from_slice_with_options, to_vec};
use libfuzzer_sys::fuzz_target;
use serde_json::Map;

/// Nesting limit for raw inputs, below the reference parser's own limit.
const MAX_DEPTH: usize = 100;

#[derive(Debug, Arbitrary)]
struct Input {
    flags: u8,
    data: Vec<u8>,
}

#[derive(Debug)]
struct ArbitraryValue(serde_json::Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        use serde_json::Value as J;

        let value = match u.choose_index(21)? {
            0 => J::Null,
            1 => J::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                J::Number(serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?)
            }
            3 => J::from(u.arbitrary::<i64>()?),
            4 => J::from(u.arbitrary::<u64>()?),
            5..=10 => J::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                J::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                J::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

fn options(flags: u8) -> DeserializerOptions {
    DeserializerOptions {
        number_inference: if flags & 1 == 0 {
            NumberInference::Lexical
        } else {
            NumberInference::SignOnly
        },
        max_depth: Some(MAX_DEPTH),
        ..DeserializerOptions::default()
    }
}

/// Raw bytes: anything accepted must be valid JSON to the reference parser,
/// and re-encoding must reach a fixpoint.
fn check_raw(data: &[u8], options: DeserializerOptions) {
    let Ok(value) = from_slice_with_options::<Value>(data, options) else {
        return;
    };
    assert!(
        serde_json::from_slice::<serde_json::Value>(data).is_ok(),
        "accepted input the reference parser rejects: {:?}",
        String::from_utf8_lossy(data)
    );

    let encoded = to_vec(&value).expect("decoded value encodes");
    let again: Value = from_slice_with_options(&encoded, options).expect("encoded output decodes");
    assert_eq!(again, value);
    assert_eq!(to_vec(&again).expect("re-encode"), encoded);
}

/// Generated documents: text written by the reference serializer decodes to
/// the same data model.
fn check_generated(data: &[u8]) {
    let Ok(ArbitraryValue(expected)) = ArbitraryValue::arbitrary(&mut Unstructured::new(data))
    else {
        return;
    };
    let text = serde_json::to_vec(&expected).expect("reference serializer");
    let ours: Value = jsonpull::from_slice(&text).expect("generated document decodes");
    assert_eq!(serde_json::to_value(&ours).expect("to_value"), expected);
}

fuzz_target!(|input: Input| {
    if input.flags & 2 == 0 {
        check_raw(&input.data, options(input.flags));
    } else {
        check_generated(&input.data);
    }
});
