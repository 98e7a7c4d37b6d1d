//! Configuration types for the atlas-mcp server
//!
//! All configuration is read once from the environment at process start.
//! Base URLs for Jira and Confluence fall back to the shared Atlassian host
//! when no dedicated URL is configured.

use figment::Figment;
use figment::providers::Env;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

/// Authentication method used against the Atlassian APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Basic auth with email + API token
    #[default]
    Basic,
    /// OAuth client credentials (token exchange not implemented, falls back to basic)
    Oauth,
    /// Personal access token sent as a bearer token
    Pat,
}

/// Main server configuration, populated from environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared Atlassian host, e.g. `https://your-site.atlassian.net`
    #[serde(default)]
    pub atlassian_host: String,

    /// Account email for basic auth
    #[serde(default)]
    pub atlassian_email: String,

    /// API token or personal access token
    #[serde(default)]
    pub atlassian_api_token: String,

    /// Authentication method selector
    #[serde(default)]
    pub atlassian_auth_method: AuthMethod,

    /// Whether to verify TLS certificates on outbound API calls
    #[serde(default = "default_true")]
    pub atlassian_ssl_verify: bool,

    /// Dedicated Jira base URL (overrides the Atlassian host)
    #[serde(default)]
    pub jira_url: Option<String>,

    /// Dedicated Confluence base URL (overrides the Atlassian host)
    #[serde(default)]
    pub confluence_url: Option<String>,

    /// Username for basic auth against older Confluence servers
    #[serde(default)]
    pub confluence_username: Option<String>,

    /// Restrict the callable tools to the non-mutating subset
    #[serde(default)]
    pub read_only_mode: bool,

    /// Comma-separated explicit tool allow-list
    #[serde(default)]
    pub enabled_tools: Option<String>,

    /// Listen port for the HTTP transport
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen host for the HTTP transport
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            atlassian_host: String::new(),
            atlassian_email: String::new(),
            atlassian_api_token: String::new(),
            atlassian_auth_method: AuthMethod::default(),
            atlassian_ssl_verify: true,
            jira_url: None,
            confluence_url: None,
            confluence_username: None,
            read_only_mode: false,
            enabled_tools: None,
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Figment::new()
            .merge(Env::raw().only(&[
                "ATLASSIAN_HOST",
                "ATLASSIAN_EMAIL",
                "ATLASSIAN_API_TOKEN",
                "ATLASSIAN_AUTH_METHOD",
                "ATLASSIAN_SSL_VERIFY",
                "JIRA_URL",
                "CONFLUENCE_URL",
                "CONFLUENCE_USERNAME",
                "READ_ONLY_MODE",
                "ENABLED_TOOLS",
                "PORT",
                "HOST",
            ]))
            .extract()
            .map_err(|e| AtlasError::Configuration(e.to_string()))
    }

    /// Base URL used for Jira API calls
    pub fn jira_base_url(&self) -> String {
        let url = self
            .jira_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.atlassian_host);
        url.trim_end_matches('/').to_string()
    }

    /// Base URL used for Confluence API calls, without the `/wiki` suffix
    pub fn confluence_base_url(&self) -> String {
        let url = self
            .confluence_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.atlassian_host);
        url.trim_end_matches('/')
            .trim_end_matches("/wiki")
            .to_string()
    }

    /// Parsed explicit tool allow-list; `None` when filtering is inactive
    pub fn allow_list(&self) -> Option<Vec<String>> {
        let raw = self.enabled_tools.as_deref()?;
        let names: Vec<String> = raw
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if names.is_empty() { None } else { Some(names) }
    }

    /// Emit startup warnings for missing host or credential configuration
    pub fn warn_on_missing(&self) {
        if self.atlassian_host.is_empty()
            && self.jira_url.is_none()
            && self.confluence_url.is_none()
        {
            tracing::warn!(
                "No Atlassian host configured. Set ATLASSIAN_HOST, JIRA_URL, or CONFLUENCE_URL"
            );
        }
        if self.atlassian_email.is_empty() {
            tracing::warn!("No authentication configured. Set ATLASSIAN_EMAIL");
        }
        if self.atlassian_api_token.is_empty() {
            tracing::warn!("No API token configured. Set ATLASSIAN_API_TOKEN");
        }
    }
}
