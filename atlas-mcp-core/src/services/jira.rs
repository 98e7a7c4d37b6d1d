//! Jira REST v2 client

use serde_json::{Map, Value, json};

use super::{Credentials, build_client};
use crate::config::AppConfig;
use crate::error::{AtlasError, Result};

/// Default page size for JQL searches
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 50;

/// Fields accepted when creating an issue
#[derive(Debug, Clone, Default)]
pub struct CreateIssueRequest {
    pub project: String,
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: String,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub labels: Option<Vec<String>>,
    pub components: Option<Vec<String>>,
}

/// Fields accepted when updating an issue; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateIssueRequest {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub labels: Option<Vec<String>>,
}

/// Client for the Jira REST v2 API
pub struct JiraService {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl JiraService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.atlassian_ssl_verify)?,
            base_url: config.jira_base_url(),
            credentials: Credentials::from_config(config, None),
        })
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2{}", self.base_url, path)
    }

    /// Get an issue by key
    pub async fn get_issue(&self, issue_key: &str) -> Result<Value> {
        let url = self.api_url(&format!("/issue/{}", urlencoding::encode(issue_key)));
        self.send(self.client.get(url)).await
    }

    /// Search for issues with a JQL query
    pub async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Value> {
        let url = self.api_url("/search");
        let body = json!({ "jql": jql, "maxResults": max_results });
        self.send(self.client.post(url).json(&body)).await
    }

    /// List all projects visible to the configured account
    pub async fn get_projects(&self) -> Result<Value> {
        let url = self.api_url("/project");
        self.send(self.client.get(url)).await
    }

    /// Create an issue
    pub async fn create_issue(&self, request: CreateIssueRequest) -> Result<Value> {
        let url = self.api_url("/issue");
        let body = json!({ "fields": issue_fields_for_create(&request) });
        self.send(self.client.post(url).json(&body)).await
    }

    /// Update an issue; Jira responds 204 on success
    pub async fn update_issue(&self, issue_key: &str, request: UpdateIssueRequest) -> Result<Value> {
        let url = self.api_url(&format!("/issue/{}", urlencoding::encode(issue_key)));
        let body = json!({ "fields": issue_fields_for_update(&request) });
        self.send(self.client.put(url).json(&body)).await?;
        Ok(json!({ "status": "updated", "issue": issue_key }))
    }

    /// Add a comment to an issue
    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<Value> {
        let url = self.api_url(&format!(
            "/issue/{}/comment",
            urlencoding::encode(issue_key)
        ));
        let body = json!({ "body": comment });
        self.send(self.client.post(url).json(&body)).await
    }

    /// List the transitions currently available on an issue
    pub async fn get_transitions(&self, issue_key: &str) -> Result<Value> {
        let url = self.api_url(&format!(
            "/issue/{}/transitions",
            urlencoding::encode(issue_key)
        ));
        self.send(self.client.get(url)).await
    }

    /// Perform a workflow transition, optionally attaching a comment
    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<Value> {
        let url = self.api_url(&format!(
            "/issue/{}/transitions",
            urlencoding::encode(issue_key)
        ));
        let body = transition_body(transition_id, comment);
        self.send(self.client.post(url).json(&body)).await?;
        Ok(json!({
            "status": "transitioned",
            "issue": issue_key,
            "transition": transition_id,
        }))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let response = self
            .credentials
            .apply(req)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AtlasError::Api {
                service: "jira",
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }
}

fn issue_fields_for_create(request: &CreateIssueRequest) -> Value {
    let mut fields = Map::new();
    fields.insert("project".into(), json!({ "key": request.project }));
    fields.insert("summary".into(), json!(request.summary));
    fields.insert("issuetype".into(), json!({ "name": request.issue_type }));
    if let Some(description) = &request.description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(priority) = &request.priority {
        fields.insert("priority".into(), json!({ "name": priority }));
    }
    if let Some(assignee) = &request.assignee {
        fields.insert("assignee".into(), json!({ "name": assignee }));
    }
    if let Some(labels) = &request.labels {
        fields.insert("labels".into(), json!(labels));
    }
    if let Some(components) = &request.components {
        let named: Vec<Value> = components.iter().map(|c| json!({ "name": c })).collect();
        fields.insert("components".into(), json!(named));
    }
    Value::Object(fields)
}

fn issue_fields_for_update(request: &UpdateIssueRequest) -> Value {
    let mut fields = Map::new();
    if let Some(summary) = &request.summary {
        fields.insert("summary".into(), json!(summary));
    }
    if let Some(description) = &request.description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(priority) = &request.priority {
        fields.insert("priority".into(), json!({ "name": priority }));
    }
    if let Some(assignee) = &request.assignee {
        fields.insert("assignee".into(), json!({ "name": assignee }));
    }
    if let Some(labels) = &request.labels {
        fields.insert("labels".into(), json!(labels));
    }
    Value::Object(fields)
}

fn transition_body(transition_id: &str, comment: Option<&str>) -> Value {
    match comment {
        Some(comment) => json!({
            "transition": { "id": transition_id },
            "update": { "comment": [ { "add": { "body": comment } } ] },
        }),
        None => json!({ "transition": { "id": transition_id } }),
    }
}
