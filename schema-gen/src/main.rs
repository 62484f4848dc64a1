use energy_quote::input::{QuoteRequest, QuoterConfig};
use schemars::schema_for;
use std::env;

fn main() {
    let schema = match env::args().nth(1).as_deref() {
        Some("request") => schema_for!(QuoteRequest),
        _ => schema_for!(QuoterConfig),
    };
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
