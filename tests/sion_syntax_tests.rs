use serde::Deserialize;
use serde_sion::{decode, from_str, sion, Error, SionMap, Value};

const GIF: [u8; 42] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x44, 0x00, 0x3b,
];

const MIXED_STRING: &str = "漢字、カタカナ、ひらがなの入ったstring😇";

fn parse(input: &str) -> Value {
    decode(input.as_bytes()).unwrap()
}

fn key(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn test_scalar_literals() {
    assert_eq!(parse(r#""foo""#), Value::from("foo"));
    assert_eq!(parse(r#""fo\no""#), Value::from("fo\no"));
    assert_eq!(parse("314.3"), Value::Float(314.3));
    assert_eq!(parse("-314.3"), Value::Float(-314.3));
    assert_eq!(parse("true"), Value::Bool(true));
    assert_eq!(parse("false"), Value::Bool(false));
    assert_eq!(parse("nil"), Value::Nil);
}

#[test]
fn test_small_containers() {
    assert_eq!(parse("[true, 1]"), sion!([true, 1]));
    assert_eq!(parse(r#"[true, [1: "foo"]]"#), sion!([true, {1: "foo"}]));
    assert_eq!(parse("[true, [:]]"), sion!([true, [:]]));
    assert_eq!(parse("[:]"), Value::Map(SionMap::new()));
    assert_eq!(parse("[]"), Value::Array(vec![]));
}

#[test]
fn test_json_like_document() {
    let input = format!(
        r#"
        [
            "nil":      nil,
            "bool":     true,
            "int":      -42,
            "double":   42.195,
            "string":   "{MIXED_STRING}",
            "array":    [nil, true, 1, 1.0, "one", [1], ["one":1.0]],
            "dictionary":   [
                "nil":nil, "bool":false, "int":0, "double":0.0, "string":"","array":[], "object":[:]
            ],
            "url":"https://github.com/dankogai/"
        ]
        "#
    );

    let expected = sion!({
        "nil": nil,
        "bool": true,
        "int": (-42),
        "double": 42.195,
        "string": MIXED_STRING,
        "array": [nil, true, 1, 1.0, "one", [1], {"one": 1.0}],
        "dictionary": {
            "nil": nil,
            "bool": false,
            "int": 0,
            "double": 0.0,
            "string": "",
            "array": [],
            "object": [:]
        },
        "url": "https://github.com/dankogai/"
    });

    assert_eq!(parse(&input), expected);
}

#[test]
fn test_full_featured_document() {
    let input = format!(
        r#"
        [
            "array" : [
                nil,
                true,
                1,    // Int in decimal
                1.0,  // Double in decimal
                "one",
                [1],
                ["one" : 1.0]
            ],
            "bool" : true,
            "data" : .Data("R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7"),
            "date" : .Date(0x0p+0),
            "dictionary" : [
                "array" : [],
                "bool" : false,
                "double" : 0x0p+0, // no `.`, so an Int
                "int" : 0,
                "nil" : nil,
                "object" : [:],
                "string" : ""
            ],
            "double" : 0x1.518f5c28f5c29p+5, // Double in hexadecimal
            "int" : -0x2a, // Int in hexadecimal
            "nil" : nil,
            "string" : "{MIXED_STRING}",
            "url" : "https://github.com/dankogai/",
            true  : "Yes, SION",
            1     : "does accept",
            1.0   : "non-String keys."
        ]
        "#
    );

    let value = parse(&input);
    let map = value.as_map().unwrap();
    assert_eq!(map.len(), 14);

    assert_eq!(
        map.get(&key("array")),
        Some(&sion!([nil, true, 1, 1.0, "one", [1], {"one": 1.0}]))
    );
    assert_eq!(map.get(&key("data")), Some(&Value::Bytes(GIF.to_vec())));
    assert_eq!(
        map.get(&key("date"))
            .and_then(Value::as_timestamp)
            .map(|t| t.timestamp()),
        Some(0)
    );
    assert_eq!(
        map.get(&key("dictionary")),
        Some(&sion!({
            "array": [],
            "bool": false,
            "double": 0,
            "int": 0,
            "nil": nil,
            "object": [:],
            "string": ""
        }))
    );
    assert_eq!(map.get(&key("double")), Some(&Value::Float(42.195)));
    assert_eq!(map.get(&key("int")), Some(&Value::Int(-42)));
    assert_eq!(map.get(&key("nil")), Some(&Value::Nil));
    assert_eq!(map.get(&key("string")), Some(&Value::from(MIXED_STRING)));
    assert_eq!(map.get(&Value::Bool(true)), Some(&key("Yes, SION")));
    assert_eq!(map.get(&Value::Int(1)), Some(&key("does accept")));
    assert_eq!(map.get(&Value::Float(1.0)), Some(&key("non-String keys.")));
}

#[test]
fn test_record_from_document() {
    #[derive(Deserialize)]
    struct Entry {
        title: String,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let entry: Entry = from_str(
        r#"
        [
            "title": "hello\nworld",
            "created_at": .Date(1531314574)
        ]
        "#,
    )
    .unwrap();

    assert_eq!(entry.title, "hello\nworld");
    assert_eq!(entry.created_at.timestamp(), 1531314574);
}

#[test]
fn test_gif_payload_length() {
    let value = parse(r#".Data("R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7")"#);
    assert_eq!(value.as_bytes().map(<[u8]>::len), Some(GIF.len()));
}

#[test]
fn test_comments_everywhere() {
    let with_comments = parse(
        "// header\n[ // open\n \"a\" // key\n : // colon\n 1 // value\n , \"b\" : [ ] // empty\n ] // close",
    );
    assert_eq!(with_comments, parse(r#"["a": 1, "b": []]"#));
}

#[test]
fn test_malformed_input_fails() {
    assert!(matches!(decode("[1, 2".as_bytes()), Err(Error::UnexpectedEof { .. })));
    assert!(matches!(decode("truee".as_bytes()), Err(Error::Bool { .. })));
    assert!(matches!(decode("[1, 2,]".as_bytes()), Err(Error::UnknownToken { .. })));
    assert!(matches!(decode("[:1]".as_bytes()), Err(Error::EmptyMap { .. })));
    assert!(matches!(decode("[\"a\": 1, 2]".as_bytes()), Err(Error::Map { .. })));
    assert!(matches!(decode("{}".as_bytes()), Err(Error::UnknownToken { .. })));
}

#[test]
fn test_errors_are_syntax_errors() {
    for input in ["truee", "nul", "1.2.3", "[1 2]", "[1: 2 3]", ".Data(\"!\")", ".Date(x)", "@", "1 2"] {
        let err = decode(input.as_bytes()).unwrap_err();
        assert!(err.is_syntax(), "{}: {:?}", input, err);
        assert!(err.position().is_some(), "{}", input);
    }
}
