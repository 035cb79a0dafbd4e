//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use serde_sion::{decode, sion, to_string, to_value, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build config dynamically with sion! macro
    let config = sion!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging", "metrics"],
        "debug": true,
        404: "not found"
    });

    println!("Config as SION:\n{}\n", to_string(&config)?);

    // Access values dynamically
    if let Value::Map(map) = &config {
        if let Some(host) = map.get(&Value::from("host")).and_then(Value::as_str) {
            println!("Accessing field 'host': {}", host);
        }

        if let Some(port) = map.get(&Value::from("port")).and_then(Value::as_i64) {
            println!("Accessing field 'port': {}", port);
        }

        if let Some(Value::Array(features)) = map.get(&Value::from("features")) {
            println!("Accessing field 'features': {} items", features.len());
        }

        if let Some(reason) = map.get(&Value::Int(404)).and_then(Value::as_str) {
            println!("Accessing integer key 404: {}\n", reason);
        }
    }

    // Parse a document with extended literals
    let doc = decode(r#"["logo": .Data("R0lG"), "built": .Date(0), 1.5: "float key"]"#.as_bytes())?;
    if let Value::Map(map) = &doc {
        for (key, value) in map.iter() {
            println!("  {} key -> {} value", key.kind(), value.kind());
        }
    }

    // Convert existing struct to Value
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        roles: vec!["admin".to_string(), "developer".to_string()],
    };

    let user_value = to_value(&user)?;
    println!("\nUser as Value:\n{}\n", to_string(&user_value)?);

    // Runtime type checking
    println!("Type checks:");
    println!("  is_map:    {}", user_value.is_map());
    println!("  is_array:  {}", user_value.is_array());
    println!("  is_string: {}", user_value.is_string());

    Ok(())
}
