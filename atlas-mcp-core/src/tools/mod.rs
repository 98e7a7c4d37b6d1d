//! Declarative tool table
//!
//! Every exposed tool is one row: name, description, read/write
//! classification, redaction flag, argument schema, and handler. The access
//! policy, the health listing, and the MCP `tools/list` response are all
//! derived from this single table, so the read/write partition is exhaustive
//! by construction.

pub mod confluence;
pub mod jira;

use std::sync::Arc;

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};

use crate::error::{AtlasError, Result};
use crate::services::Services;

/// Read/write classification of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAccess {
    /// Non-mutating; callable in read-only mode
    Read,
    /// Mutates remote state; disabled in read-only mode
    Write,
}

/// Service group a tool belongs to, used for the health listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolGroup {
    Jira,
    Confluence,
}

/// Primitive kind of a tool argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    Boolean,
    StringArray,
}

impl ArgKind {
    fn json_schema(&self) -> Value {
        match self {
            ArgKind::String => json!({ "type": "string" }),
            ArgKind::Integer => json!({ "type": "number" }),
            ArgKind::Boolean => json!({ "type": "boolean" }),
            ArgKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ArgKind::String => value.is_string(),
            ArgKind::Integer => value.is_number(),
            ArgKind::Boolean => value.is_boolean(),
            ArgKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// One declared argument of a tool
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub description: &'static str,
}

/// Handler signature: validated arguments in, raw result out
pub type ToolHandler = fn(Arc<Services>, Value) -> BoxFuture<'static, Result<Value>>;

/// One row of the tool table
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub group: ToolGroup,
    pub access: ToolAccess,
    /// Whether the payload may carry free-text content requiring a
    /// redaction scan. Declared by the tool author at this row.
    pub pii: bool,
    pub args: &'static [ArgSpec],
    pub handler: ToolHandler,
}

impl ToolSpec {
    /// JSON Schema for the tool's input, derived from the argument rows
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in self.args {
            let mut schema = arg.kind.json_schema();
            if let Value::Object(map) = &mut schema {
                map.insert("description".into(), json!(arg.description));
            }
            properties.insert(arg.name.to_string(), schema);
            if arg.required {
                required.push(arg.name);
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

static ALL_TOOLS: Lazy<Vec<&'static ToolSpec>> = Lazy::new(|| {
    confluence::TOOLS
        .iter()
        .chain(jira::TOOLS.iter())
        .collect()
});

/// The complete tool table, Confluence rows first
pub fn all_tools() -> &'static [&'static ToolSpec] {
    &ALL_TOOLS
}

/// Look a tool up by name
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    ALL_TOOLS.iter().copied().find(|t| t.name == name)
}

/// Validate an argument record against a tool's declared schema.
///
/// Checks required presence and primitive kinds; undeclared fields are
/// ignored, mirroring the loose validation of the remote APIs themselves.
pub fn validate_args(spec: &ToolSpec, args: &Value) -> Result<()> {
    let empty = Map::new();
    let record = match args {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(AtlasError::InvalidArguments(
                "arguments must be an object".to_string(),
            ));
        }
    };

    for arg in spec.args {
        match record.get(arg.name) {
            None | Some(Value::Null) => {
                if arg.required {
                    return Err(AtlasError::InvalidArguments(format!(
                        "missing required argument '{}'",
                        arg.name
                    )));
                }
            }
            Some(value) => {
                if !arg.kind.matches(value) {
                    return Err(AtlasError::InvalidArguments(format!(
                        "argument '{}' has the wrong type",
                        arg.name
                    )));
                }
            }
        }
    }
    Ok(())
}

// Argument extraction helpers for handlers. Validation has already run, so
// failures here are reported as invalid-argument tool errors rather than
// panics.

pub(crate) fn require_str(args: &Value, name: &str) -> Result<String> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AtlasError::InvalidArguments(format!("missing required argument '{name}'")))
}

pub(crate) fn opt_str(args: &Value, name: &str) -> Option<String> {
    args.get(name).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn opt_u32(args: &Value, name: &str) -> Option<u32> {
    args.get(name).and_then(Value::as_u64).map(|n| n as u32)
}

pub(crate) fn require_i64(args: &Value, name: &str) -> Result<i64> {
    args.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| AtlasError::InvalidArguments(format!("missing required argument '{name}'")))
}

pub(crate) fn opt_string_vec(args: &Value, name: &str) -> Option<Vec<String>> {
    let items = args.get(name)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
