//! Atlassian REST clients
//!
//! Thin request/response mappers over the Jira REST v2 and Confluence v2
//! (plus v1 CQL search) APIs. Remote failures surface as [`AtlasError::Api`]
//! with the status and body text; the envelope builder is the only consumer
//! of those errors.

pub mod confluence;
pub mod jira;

pub use confluence::ConfluenceService;
pub use jira::JiraService;

use crate::config::{AppConfig, AuthMethod};
use crate::error::Result;

/// Shared handle to the external-service clients, one per process
pub struct Services {
    pub jira: JiraService,
    pub confluence: ConfluenceService,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            jira: JiraService::from_config(config)?,
            confluence: ConfluenceService::from_config(config)?,
        })
    }
}

/// Credential material applied to every outbound request
#[derive(Debug, Clone)]
pub(crate) enum Credentials {
    Basic { user: String, token: String },
    Bearer { token: String },
}

impl Credentials {
    /// Resolve credentials from configuration.
    ///
    /// `username_override` is used for basic auth against older Confluence
    /// servers. OAuth token exchange is not implemented; the selector falls
    /// back to basic auth with email + token.
    pub(crate) fn from_config(config: &AppConfig, username_override: Option<&str>) -> Self {
        match config.atlassian_auth_method {
            AuthMethod::Pat => Credentials::Bearer {
                token: config.atlassian_api_token.clone(),
            },
            AuthMethod::Basic | AuthMethod::Oauth => {
                let user = username_override
                    .filter(|u| !u.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| config.atlassian_email.clone());
                Credentials::Basic {
                    user,
                    token: config.atlassian_api_token.clone(),
                }
            }
        }
    }

    pub(crate) fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credentials::Basic { user, token } => req.basic_auth(user, Some(token)),
            Credentials::Bearer { token } => req.bearer_auth(token),
        }
    }
}

/// Build the outbound HTTP client, honoring the SSL-verification toggle
pub(crate) fn build_client(ssl_verify: bool) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .danger_accept_invalid_certs(!ssl_verify)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pat_selects_bearer() {
        let config = AppConfig {
            atlassian_auth_method: AuthMethod::Pat,
            atlassian_api_token: "pat-token".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            Credentials::from_config(&config, None),
            Credentials::Bearer { .. }
        ));
    }

    #[test]
    fn test_oauth_falls_back_to_basic() {
        let config = AppConfig {
            atlassian_auth_method: AuthMethod::Oauth,
            atlassian_email: "dev@example.com".to_string(),
            atlassian_api_token: "token".to_string(),
            ..AppConfig::default()
        };
        match Credentials::from_config(&config, None) {
            Credentials::Basic { user, .. } => assert_eq!(user, "dev@example.com"),
            other => panic!("expected basic credentials, got {other:?}"),
        }
    }

    #[test]
    fn test_username_override_for_older_servers() {
        let config = AppConfig {
            atlassian_email: "dev@example.com".to_string(),
            ..AppConfig::default()
        };
        match Credentials::from_config(&config, Some("svc-confluence")) {
            Credentials::Basic { user, .. } => assert_eq!(user, "svc-confluence"),
            other => panic!("expected basic credentials, got {other:?}"),
        }
    }
}
