//! Custom assertions para tests.

use serde_json::Value;

/// Verifica que el body tenga la forma `{status, message, data?}`.
pub fn assert_envelope(json: &Value) {
    let obj = json.as_object().expect("Response should be a JSON object");

    assert!(obj["status"].is_i64(), "'status' should be an integer");
    assert!(obj["message"].is_string(), "'message' should be a string");
    assert!(
        !obj["message"].as_str().unwrap().is_empty(),
        "'message' should not be empty"
    );
    for key in obj.keys() {
        assert!(
            matches!(key.as_str(), "status" | "message" | "data"),
            "Unexpected envelope field '{}'",
            key
        );
    }
}

/// Unix seconds, for building announcement windows.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
