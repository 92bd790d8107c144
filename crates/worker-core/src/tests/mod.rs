mod click;
mod push;

use serde_json::{Map, Value};

/// Build a data map from a JSON object literal.
fn data(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
