#![allow(dead_code)]
use gateway_core::ServerRecord;

/// Parses a server record from JSON.
/// Panics if the JSON is invalid (intended for tests).
pub fn server_from_json(json: &str) -> ServerRecord {
    serde_json::from_str(json).expect("Failed to parse test server record")
}
