use energy_quote::input::{QuoteRequest, QuoterConfig};
use schemars::schema_for;

#[test]
fn test_generate_config_json_schema() {
    let schema = schema_for!(QuoterConfig);
    assert!(serde_json::to_string_pretty(&schema).is_ok());
}

#[test]
fn test_generate_request_json_schema() {
    let schema = schema_for!(QuoteRequest);
    let json = serde_json::to_value(&schema).unwrap();
    assert!(json["properties"]["monthly_consumption_kwh"].is_object());
}
