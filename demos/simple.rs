//! Basic SION serialization and deserialization.
//!
//! Run with: cargo run --example simple

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_sion::{from_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
    joined: DateTime<Utc>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let input = r#"
    // Users exported from the admin console
    [
        [
            "id": 0x2a,
            "name": "Alice Johnson",
            "email": "alice@example.com",
            "joined": .Date(1531314574)
        ],
        [
            "id": 43,
            "name": "Bob Smith",
            "email": "bob@example.com",
            "joined": .Date(1600000000)
        ]
    ]
    "#;

    let users: Vec<User> = from_str(input)?;
    for user in &users {
        println!("{} <{}> joined {}", user.name, user.email, user.joined);
    }

    // Serialize back to SION
    let sion = to_string(&users)?;
    println!("\nSION output:\n{}\n", sion);

    // Deserialize back to struct
    let users_back: Vec<User> = from_str(&sion)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}
