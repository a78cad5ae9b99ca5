#![expect(missing_docs)]

use std::collections::{BTreeMap, HashMap};

use jsonpull::{
    Deserializer, DeserializerOptions, ErrorKind, GrammarError, NumberInference, Value,
    from_reader, from_slice, from_str, from_str_with_options, to_string, to_vec,
};
use serde::{Deserialize, Serialize, de::IgnoredAny};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    #[serde(rename = "A")]
    a: String,
    #[serde(rename = "B")]
    b: String,
    #[serde(rename = "C")]
    c: i32,
    #[serde(rename = "D")]
    d: i64,
}

#[test]
fn fields_arrive_in_any_order() {
    let input = r#"{"C": -112323, "A": "xxx", "D": 59583, "B": "yyy"}"#;
    let record: Record = from_str(input).unwrap();
    assert_eq!(
        record,
        Record {
            a: "xxx".into(),
            b: "yyy".into(),
            c: -112_323,
            d: 59583,
        }
    );
    assert_eq!(
        to_string(&record).unwrap(),
        r#"{"A":"xxx","B":"yyy","C":-112323,"D":59583}"#
    );
}

#[test]
fn missing_field_is_a_data_error() {
    let err = from_str::<Record>(r#"{"A": "x", "B": "y", "C": 1}"#).unwrap_err();
    assert!(err.to_string().contains("missing field `D`"), "{err}");
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Shape {
    Empty,
    Circle(f64),
    Point(i32, i32),
    Rect { w: u32, h: u32 },
}

#[test]
fn enums_are_externally_tagged() {
    let shapes = vec![
        Shape::Empty,
        Shape::Circle(1.5),
        Shape::Point(1, -2),
        Shape::Rect { w: 3, h: 4 },
    ];
    let text = to_string(&shapes).unwrap();
    assert_eq!(
        text,
        r#"["Empty",{"Circle":1.5},{"Point":[1,-2]},{"Rect":{"w":3,"h":4}}]"#
    );
    assert_eq!(from_str::<Vec<Shape>>(&text).unwrap(), shapes);
}

#[test]
fn unit_variant_in_object_form() {
    assert_eq!(from_str::<Shape>(r#"{"Empty": null}"#).unwrap(), Shape::Empty);
}

#[test]
fn enum_object_with_two_keys_is_rejected() {
    let err = from_str::<Shape>(r#"{"Circle": 1.0, "Empty": null}"#).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Grammar(GrammarError::ExpectedObjectEnd)
    ));
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Profile {
    name: String,
    nickname: Option<String>,
    scores: Vec<u8>,
    tags: BTreeMap<String, bool>,
    origin: (f32, f32),
    initial: char,
    #[serde(default)]
    extra: Option<Box<Profile>>,
}

#[test]
fn nested_records_round_trip() {
    let profile = Profile {
        name: "ada".into(),
        nickname: None,
        scores: vec![1, 2, 255],
        tags: [("admin".to_string(), true), ("beta".to_string(), false)].into(),
        origin: (0.5, -1.25),
        initial: '\u{e9}',
        extra: Some(Box::new(Profile {
            name: "bob".into(),
            nickname: Some("b\"b".into()),
            scores: vec![],
            tags: BTreeMap::new(),
            origin: (0.0, 0.0),
            initial: 'b',
            extra: None,
        })),
    };
    let bytes = to_vec(&profile).unwrap();
    assert_eq!(from_slice::<Profile>(&bytes).unwrap(), profile);
    assert_eq!(from_reader::<_, Profile>(bytes.as_slice()).unwrap(), profile);
}

#[test]
fn integer_map_keys_are_quoted() {
    let map: HashMap<u32, String> = [(7, "seven".to_string())].into();
    let text = to_string(&map).unwrap();
    assert_eq!(text, r#"{"7":"seven"}"#);
    assert_eq!(from_str::<HashMap<u32, String>>(&text).unwrap(), map);

    let signed: BTreeMap<i64, bool> = from_str(r#"{"-3": true, "4": false}"#).unwrap();
    assert_eq!(signed, [(-3, true), (4, false)].into());
}

#[test]
fn unknown_fields_are_skipped_whatever_their_depth() {
    #[derive(Deserialize, Debug)]
    struct Keep {
        keep: u8,
    }

    let depth = 10_000;
    let input = format!(
        r#"{{"skip": {}{}, "keep": 7}}"#,
        "[".repeat(depth),
        "]".repeat(depth)
    );
    let value: Keep = from_str(&input).unwrap();
    assert_eq!(value.keep, 7);

    let _: IgnoredAny = from_str(&input).unwrap();
}

#[test]
fn depth_limit_applies_to_records() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Outer {
        inner: Vec<Vec<u8>>,
    }

    let options = DeserializerOptions {
        max_depth: Some(2),
        ..DeserializerOptions::default()
    };
    let err = from_str_with_options::<Outer>(r#"{"inner": [[1]]}"#, options).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Grammar(GrammarError::DepthLimitExceeded(2))
    ));
}

#[test]
fn sign_only_inference_reaches_values() {
    let options = DeserializerOptions {
        number_inference: NumberInference::SignOnly,
        ..DeserializerOptions::default()
    };
    let value: Value = from_str_with_options("[-1, 1, 1.5]", options).unwrap();
    assert_eq!(value.to_string(), "[-1,1,1.5]");
    assert_eq!(value.as_array().unwrap()[0].as_i64(), Some(-1));
}

#[test]
fn deserializer_can_read_a_prefix_then_check_the_end() {
    let mut de = Deserializer::from_str("[1, 2] [3]");
    let first: Vec<u8> = Deserialize::deserialize(&mut de).unwrap();
    assert_eq!(first, [1, 2]);
    let err = de.end().unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Grammar(GrammarError::TrailingCharacters)
    ));
}

#[test]
fn bytes_travel_as_arrays() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Blob {
        #[serde(with = "raw")]
        data: Vec<u8>,
    }

    mod raw {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
            s.serialize_bytes(bytes)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
            Vec::<u8>::deserialize(d)
        }
    }

    let blob = Blob {
        data: vec![0, 127, 255],
    };
    let text = to_string(&blob).unwrap();
    assert_eq!(text, r#"{"data":[0,127,255]}"#);
    assert_eq!(from_str::<Blob>(&text).unwrap(), blob);
}

/// Takes `value` apart one level at a time and returns how deep it was.
fn unnest(value: Value) -> usize {
    let mut depth = 0;
    let mut next = Some(value);
    while let Some(current) = next.take() {
        match current {
            Value::Array(mut items) => {
                depth += 1;
                next = items.pop();
            }
            Value::Object(mut map) => {
                depth += 1;
                next = map.pop().map(|(_, v)| v);
            }
            _ => {}
        }
    }
    depth
}

#[test]
fn values_decode_at_any_depth() {
    let depth = 10_000;
    let arrays = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    assert_eq!(unnest(from_str(&arrays).unwrap()), depth);
    assert_eq!(unnest(from_reader(arrays.as_bytes()).unwrap()), depth);

    let objects = format!("{}null{}", r#"{"a":"#.repeat(depth), "}".repeat(depth));
    assert_eq!(unnest(from_str(&objects).unwrap()), depth);

    let mut de = Deserializer::from_str(&arrays);
    assert_eq!(unnest(de.parse_value().unwrap()), depth);
    de.end().unwrap();
}

#[test]
fn values_nest_inside_records() {
    #[derive(Deserialize, Debug)]
    struct Envelope {
        id: u8,
        body: Value,
        rest: Vec<Value>,
    }

    let input = r#"{"body": {"k": [1, "two", null], "e": {}}, "rest": [true, -3, 0.5], "id": 4}"#;
    let envelope: Envelope = from_str(input).unwrap();
    assert_eq!(envelope.id, 4);
    assert_eq!(envelope.body.to_string(), r#"{"k":[1,"two",null],"e":{}}"#);
    assert_eq!(to_string(&envelope.rest).unwrap(), "[true,-3,0.5]");

    let option: Option<Value> = from_str("[null]").unwrap();
    assert_eq!(option.unwrap().to_string(), "[null]");
}

#[test]
fn values_decode_through_other_deserializers() {
    let input = r#"{"a": [1, -2, 2.5, "s", {"b": null}], "c": false}"#;
    let ours: Value = from_str(input).unwrap();
    let theirs: Value = serde_json::from_str(input).unwrap();
    assert_eq!(ours, theirs);
}

#[derive(Deserialize, Debug)]
struct Node {
    next: Option<Box<Node>>,
}

fn chain(depth: usize) -> String {
    format!("{}null{}", r#"{"next":"#.repeat(depth), "}".repeat(depth))
}

#[test]
fn typed_nesting_stops_at_the_recursion_limit() {
    assert!(from_str::<Node>(&chain(jsonpull::DEFAULT_RECURSION_LIMIT)).is_ok());

    let err = from_str::<Node>(&chain(jsonpull::DEFAULT_RECURSION_LIMIT + 1)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::RecursionLimitExceeded(128)));
    assert_eq!((err.line(), err.column()), (1, 1025));
    assert!(err.to_string().starts_with("recursion limit of 128 exceeded"));

    let options = DeserializerOptions {
        recursion_limit: Some(4),
        ..DeserializerOptions::default()
    };
    let err = from_str_with_options::<Vec<Vec<Vec<Vec<Vec<u8>>>>>>("[[[[[1]]]]]", options)
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::RecursionLimitExceeded(4)));

    let options = DeserializerOptions {
        recursion_limit: None,
        ..DeserializerOptions::default()
    };
    assert!(from_str_with_options::<Node>(&chain(150), options).is_ok());
}

#[test]
fn failed_value_poisons_the_deserializer() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Small {
        a: u8,
    }

    let mut de = Deserializer::from_str(r#"{"a": "x"} 5"#);
    let err = Small::deserialize(&mut de).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));

    let err = de.end().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Grammar(GrammarError::Poisoned)));
    let err = u8::deserialize(&mut de).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Grammar(GrammarError::Poisoned)));

    let mut de = Deserializer::from_str("[300, 1]");
    assert!(Vec::<u8>::deserialize(&mut de).is_err());
    let err = de.end().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Grammar(GrammarError::Poisoned)));
}

#[test]
fn bytes_come_from_strings_or_arrays() {
    #[derive(Debug, PartialEq)]
    struct Bytes(Vec<u8>);

    struct BytesVisitor;

    impl<'de> serde::de::Visitor<'de> for BytesVisitor {
        type Value = Bytes;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("bytes")
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Bytes, E> {
            Ok(Bytes(v.to_vec()))
        }

        fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Bytes, A::Error> {
            let mut out = Vec::new();
            while let Some(b) = seq.next_element()? {
                out.push(b);
            }
            Ok(Bytes(out))
        }
    }

    impl<'de> Deserialize<'de> for Bytes {
        fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
            d.deserialize_bytes(BytesVisitor)
        }
    }

    assert_eq!(from_str::<Bytes>(r#""hi""#).unwrap(), Bytes(vec![104, 105]));
    assert_eq!(from_str::<Bytes>("[1, 2]").unwrap(), Bytes(vec![1, 2]));
    let err = from_str::<Bytes>("true").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
}
