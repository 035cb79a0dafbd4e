use serde_sion::{sion, to_string, SionMap, Value};

#[test]
fn test_sion_macro_nil() {
    assert_eq!(sion!(nil), Value::Nil);
}

#[test]
fn test_sion_macro_booleans() {
    assert_eq!(sion!(true), Value::Bool(true));
    assert_eq!(sion!(false), Value::Bool(false));
}

#[test]
fn test_sion_macro_numbers() {
    assert_eq!(sion!(42), Value::Int(42));
    assert_eq!(sion!(3.5), Value::Float(3.5));
    assert_eq!(sion!((-123)), Value::Int(-123));
    assert_eq!(sion!(0x2a), Value::Int(42));
    assert_eq!(sion!(1.0), Value::Float(1.0));
}

#[test]
fn test_sion_macro_strings() {
    assert_eq!(sion!("hello world"), Value::from("hello world"));
    assert_eq!(sion!(""), Value::String(String::new()));
}

#[test]
fn test_sion_macro_arrays() {
    assert_eq!(sion!([]), Value::Array(vec![]));

    assert_eq!(
        sion!([1, "hello", true, nil]),
        Value::Array(vec![
            Value::Int(1),
            Value::from("hello"),
            Value::Bool(true),
            Value::Nil,
        ])
    );

    assert_eq!(
        sion!([[1, 2], [3]]),
        Value::Array(vec![
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
            Value::Array(vec![Value::Int(3)]),
        ])
    );
}

#[test]
fn test_sion_macro_empty_maps() {
    assert_eq!(sion!([:]), Value::Map(SionMap::new()));
    assert_eq!(sion!({}), Value::Map(SionMap::new()));
}

#[test]
fn test_sion_macro_maps() {
    let value = sion!({
        "name": "Alice",
        "age": 30,
        "active": true
    });

    let map = value.as_map().unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&Value::from("name")), Some(&Value::from("Alice")));
    assert_eq!(map.get(&Value::from("age")), Some(&Value::Int(30)));
    assert_eq!(map.get(&Value::from("active")), Some(&Value::Bool(true)));
}

#[test]
fn test_sion_macro_non_string_keys() {
    let value = sion!({
        true: "Yes, SION",
        1: "does accept",
        1.0: "non-String keys.",
        nil: "even nil"
    });

    let map = value.as_map().unwrap();
    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&Value::Bool(true)), Some(&Value::from("Yes, SION")));
    assert_eq!(map.get(&Value::Int(1)), Some(&Value::from("does accept")));
    assert_eq!(
        map.get(&Value::Float(1.0)),
        Some(&Value::from("non-String keys."))
    );
    assert_eq!(map.get(&Value::Nil), Some(&Value::from("even nil")));
}

#[test]
fn test_sion_macro_nested() {
    let value = sion!({
        "user": {
            "name": "Bob",
            "scores": [95, 87, 92]
        },
        "tags": ["admin", "developer"],
        "empty": [:]
    });

    let map = value.as_map().unwrap();
    let user = map.get(&Value::from("user")).and_then(Value::as_map).unwrap();
    assert_eq!(user.get(&Value::from("name")), Some(&Value::from("Bob")));
    assert_eq!(
        user.get(&Value::from("scores")),
        Some(&sion!([95, 87, 92]))
    );
    assert_eq!(
        map.get(&Value::from("empty")),
        Some(&Value::Map(SionMap::new()))
    );
}

#[test]
fn test_sion_macro_expressions() {
    let name = "Carol";
    let scores = vec![1.5, 2.5];
    let value = sion!({
        "name": name,
        "scores": scores,
        "count": (2 + 3)
    });

    assert_eq!(
        value,
        sion!({
            "name": "Carol",
            "scores": [1.5, 2.5],
            "count": 5
        })
    );
}

#[test]
fn test_sion_macro_encodes() {
    let value = sion!([nil, true, (-42), 42.195, "str", {1: "one"}, [:]]);
    assert_eq!(
        to_string(&value).unwrap(),
        r#"[nil,true,-42,42.195,"str",[1:"one"],[:]]"#
    );
}
