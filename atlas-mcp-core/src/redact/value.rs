//! Structure-aware redaction over JSON values
//!
//! Deliberately narrow scope: the only terminal action is rewriting the
//! `body.storage.value` string that Confluence content payloads carry.
//! Every other field passes through unmodified at any depth, even when it
//! holds free text.

use serde_json::Value;

use super::text::redact_text;

/// Redact a structured tool result.
///
/// When `scan` is false the value is returned unchanged without traversal.
/// Never fails on malformed input; non-object, non-matching values are
/// returned as-is.
pub fn redact_value(value: Value, scan: bool) -> Value {
    if !scan {
        return value;
    }
    let mut value = value;
    scrub(&mut value);
    value
}

fn scrub(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "body" {
                    scrub_body(child);
                }
                scrub(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                scrub(item);
            }
        }
        _ => {}
    }
}

fn scrub_body(body: &mut Value) {
    let Some(storage) = body.get_mut("storage") else {
        return;
    };
    if let Some(Value::String(text)) = storage.get_mut("value") {
        *text = redact_text(text);
    }
}
