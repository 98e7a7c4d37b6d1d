//! Tool access policy
//!
//! Pure predicate over a tool name and the process-wide configuration
//! snapshot. Precedence is fixed: the read-only restriction is checked before
//! the explicit allow-list, so a write tool can never be enabled in read-only
//! mode regardless of allow-list content. A name absent from the tool table
//! is a configuration defect and is treated as not enabled.

use crate::config::AppConfig;
use crate::tools::{self, ToolAccess, ToolGroup, ToolSpec};

/// Decide whether a tool is callable under the given configuration
pub fn is_tool_enabled(tool_name: &str, config: &AppConfig) -> bool {
    // Unknown names fail closed.
    let Some(spec) = tools::find_tool(tool_name) else {
        return false;
    };

    // Read-only mode restricts to the non-mutating subset, before any
    // allow-list is consulted.
    if config.read_only_mode && spec.access != ToolAccess::Read {
        return false;
    }

    // An explicit, non-empty allow-list restricts to its members.
    if let Some(allow_list) = config.allow_list() {
        return allow_list.iter().any(|name| name == tool_name);
    }

    // By default, all tools are enabled.
    true
}

/// The subset of the tool table enabled under the given configuration
pub fn enabled_tools(config: &AppConfig) -> Vec<&'static ToolSpec> {
    tools::all_tools()
        .iter()
        .copied()
        .filter(|spec| is_tool_enabled(spec.name, config))
        .collect()
}

/// Enabled tool names for one service group, for the health listing
pub fn enabled_tool_names(config: &AppConfig, group: ToolGroup) -> Vec<&'static str> {
    enabled_tools(config)
        .into_iter()
        .filter(|spec| spec.group == group)
        .map(|spec| spec.name)
        .collect()
}

/// Log the enabled tool set at startup
pub fn log_enabled_tools(config: &AppConfig) {
    let enabled = enabled_tools(config);
    let names: Vec<&str> = enabled.iter().map(|spec| spec.name).collect();
    tracing::info!("Enabled tools ({}): {}", names.len(), names.join(", "));

    if config.read_only_mode {
        tracing::info!("Read-only mode is enabled - write operations are disabled");
    }
    if let Some(allow_list) = config.allow_list() {
        tracing::info!("Tool filtering is active: {}", allow_list.join(", "));
    }
}
