//! Response envelope construction
//!
//! Every tool invocation, success or failure, leaves the process through
//! these two constructors. Results are redaction-scanned according to the
//! caller-declared `pii` flag; error messages are scanned unconditionally
//! because they may embed leaked payload fragments.

use serde_json::Value;

use crate::mcp::protocol::{ContentBlock, ToolCallResult};
use crate::redact::{redact_text, redact_value};

/// Marker substituted when serialization hits the nesting bound
const CIRCULAR_MARKER: &str = "[Circular Reference]";

/// Nesting bound for the display serializer
const MAX_DEPTH: usize = 64;

/// Wrap a successful tool result.
///
/// `scan_pii` is declared per tool at the table row: true for content-bearing
/// payloads, false for structural metadata.
pub fn build_result(data: Value, scan_pii: bool) -> ToolCallResult {
    let scrubbed = redact_value(data, scan_pii);
    ToolCallResult {
        content: vec![ContentBlock::text(safe_stringify(&scrubbed))],
        is_error: None,
    }
}

/// Wrap a tool error. The message is always redaction-scanned.
pub fn build_error(message: &str) -> ToolCallResult {
    ToolCallResult {
        content: vec![ContentBlock::text(format!(
            "Error: {}",
            redact_text(message)
        ))],
        is_error: Some(true),
    }
}

/// Pretty-print a value for the display-text payload.
///
/// Nesting beyond [`MAX_DEPTH`] is replaced with a marker instead of
/// recursing without limit, so pathological self-similar structures
/// serialize in bounded time and space.
pub fn safe_stringify(value: &Value) -> String {
    let bounded = bound_depth(value, 0);
    serde_json::to_string_pretty(&bounded)
        .unwrap_or_else(|_| format!("\"{}\"", CIRCULAR_MARKER))
}

fn bound_depth(value: &Value, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return Value::String(CIRCULAR_MARKER.to_string());
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), bound_depth(v, depth + 1)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items.iter().map(|v| bound_depth(v, depth + 1)).collect(),
        ),
        other => other.clone(),
    }
}
