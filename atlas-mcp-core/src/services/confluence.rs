//! Confluence client
//!
//! Talks to the v2 REST API for spaces, pages, labels, and comments, and to
//! the v1 API for CQL content search (the v2 API has no equivalent endpoint).

use serde_json::{Map, Value, json};

use super::{Credentials, build_client};
use crate::config::AppConfig;
use crate::error::{AtlasError, Result};

/// Default page size for listings
pub const DEFAULT_LIMIT: u32 = 25;

/// Payload for creating a page
#[derive(Debug, Clone)]
pub struct CreatePageRequest {
    pub space_id: String,
    pub status: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub representation: String,
    pub content: String,
}

/// Payload for a full page update
#[derive(Debug, Clone)]
pub struct UpdatePageRequest {
    pub page_id: String,
    pub status: String,
    pub title: String,
    pub representation: String,
    pub content: String,
    pub version: i64,
    pub version_message: Option<String>,
}

/// Payload for creating a footer comment; exactly one target id is expected
#[derive(Debug, Clone, Default)]
pub struct CreateFooterCommentRequest {
    pub page_id: Option<String>,
    pub blog_post_id: Option<String>,
    pub parent_comment_id: Option<String>,
    pub attachment_id: Option<String>,
    pub custom_content_id: Option<String>,
    pub representation: String,
    pub content: String,
}

/// Client for the Confluence REST APIs
pub struct ConfluenceService {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ConfluenceService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.atlassian_ssl_verify)?,
            base_url: config.confluence_base_url(),
            credentials: Credentials::from_config(config, config.confluence_username.as_deref()),
        })
    }

    pub(crate) fn v2_url(&self, path: &str) -> String {
        format!("{}/wiki/api/v2{}", self.base_url, path)
    }

    pub(crate) fn v1_url(&self, path: &str) -> String {
        format!("{}/wiki/rest/api{}", self.base_url, path)
    }

    /// Get a space by ID or key
    pub async fn get_space(&self, space_id_or_key: &str) -> Result<Value> {
        let url = self.v2_url(&format!("/spaces/{}", urlencoding::encode(space_id_or_key)));
        self.send(self.client.get(url)).await
    }

    /// List spaces
    pub async fn get_spaces(&self, limit: u32, cursor: Option<&str>) -> Result<Value> {
        let url = self.v2_url("/spaces");
        let query = paged_query(limit, cursor, None);
        self.send(self.client.get(url).query(&query)).await
    }

    /// Get a page by ID with its storage-format body
    pub async fn get_page(&self, page_id: &str, body_format: &str) -> Result<Value> {
        let url = self.v2_url(&format!("/pages/{}", urlencoding::encode(page_id)));
        self.send(
            self.client
                .get(url)
                .query(&[("body-format", body_format)]),
        )
        .await
    }

    /// List pages in a space
    pub async fn get_pages_in_space(
        &self,
        space_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Value> {
        let url = self.v2_url(&format!(
            "/spaces/{}/pages",
            urlencoding::encode(space_id)
        ));
        let query = paged_query(limit, cursor, None);
        self.send(self.client.get(url).query(&query)).await
    }

    /// Search pages by title, optionally scoped to a space
    pub async fn search_pages_by_title(
        &self,
        title: Option<&str>,
        space_id: Option<&str>,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Value> {
        let url = self.v2_url("/pages");
        let mut query = paged_query(limit, cursor, space_id);
        if let Some(title) = title {
            query.push(("title", title.to_string()));
        }
        self.send(self.client.get(url).query(&query)).await
    }

    /// Search page content with a CQL query via the v1 search endpoint
    pub async fn search_content(&self, cql: &str, limit: u32, start: u32) -> Result<Value> {
        let url = self.v1_url("/search");
        self.send(self.client.get(url).query(&[
            ("cql", cql.to_string()),
            ("limit", limit.to_string()),
            ("start", start.to_string()),
        ]))
        .await
    }

    /// Create a page
    pub async fn create_page(&self, request: CreatePageRequest) -> Result<Value> {
        let url = self.v2_url("/pages");
        let body = create_page_body(&request);
        self.send(self.client.post(url).json(&body)).await
    }

    /// Update a page (full update: title, body, version bump)
    pub async fn update_page(&self, request: UpdatePageRequest) -> Result<Value> {
        let url = self.v2_url(&format!(
            "/pages/{}",
            urlencoding::encode(&request.page_id)
        ));
        let body = update_page_body(&request);
        self.send(self.client.put(url).json(&body)).await
    }

    /// Update only a page's title
    pub async fn update_page_title(
        &self,
        page_id: &str,
        title: &str,
        status: &str,
    ) -> Result<Value> {
        let url = self.v2_url(&format!("/pages/{}/title", urlencoding::encode(page_id)));
        let body = json!({ "status": status, "title": title });
        self.send(self.client.put(url).json(&body)).await
    }

    /// Delete a page
    pub async fn delete_page(&self, page_id: &str) -> Result<Value> {
        let url = self.v2_url(&format!("/pages/{}", urlencoding::encode(page_id)));
        self.send(self.client.delete(url)).await?;
        Ok(json!({ "status": "deleted", "page": page_id }))
    }

    /// List pages carrying a label
    pub async fn get_pages_by_label(
        &self,
        label: &str,
        space_id: Option<&str>,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Value> {
        let url = self.v2_url(&format!("/labels/{}/pages", urlencoding::encode(label)));
        let query = paged_query(limit, cursor, space_id);
        self.send(self.client.get(url).query(&query)).await
    }

    /// List inline comments on a page
    pub async fn get_page_inline_comments(
        &self,
        page_id: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Value> {
        let url = self.v2_url(&format!(
            "/pages/{}/inline-comments",
            urlencoding::encode(page_id)
        ));
        let query = paged_query(limit, cursor, None);
        self.send(self.client.get(url).query(&query)).await
    }

    /// Create a footer comment on a page, blog post, or another comment
    pub async fn create_footer_comment(
        &self,
        request: CreateFooterCommentRequest,
    ) -> Result<Value> {
        let url = self.v2_url("/footer-comments");
        let body = footer_comment_body(&request);
        self.send(self.client.post(url).json(&body)).await
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
                service: "confluence",
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

fn paged_query(
    limit: u32,
    cursor: Option<&str>,
    space_id: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string())];
    if let Some(space_id) = space_id {
        query.push(("space-id", space_id.to_string()));
    }
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor.to_string()));
    }
    query
}

fn create_page_body(request: &CreatePageRequest) -> Value {
    let mut body = Map::new();
    body.insert("spaceId".into(), json!(request.space_id));
    body.insert("status".into(), json!(request.status));
    body.insert("title".into(), json!(request.title));
    if let Some(parent_id) = &request.parent_id {
        body.insert("parentId".into(), json!(parent_id));
    }
    body.insert(
        "body".into(),
        json!({ "representation": request.representation, "value": request.content }),
    );
    Value::Object(body)
}

fn update_page_body(request: &UpdatePageRequest) -> Value {
    let mut version = Map::new();
    version.insert("number".into(), json!(request.version));
    if let Some(message) = &request.version_message {
        version.insert("message".into(), json!(message));
    }
    json!({
        "id": request.page_id,
        "status": request.status,
        "title": request.title,
        "body": { "representation": request.representation, "value": request.content },
        "version": Value::Object(version),
    })
}

fn footer_comment_body(request: &CreateFooterCommentRequest) -> Value {
    let mut body = Map::new();
    if let Some(page_id) = &request.page_id {
        body.insert("pageId".into(), json!(page_id));
    }
    if let Some(blog_post_id) = &request.blog_post_id {
        body.insert("blogPostId".into(), json!(blog_post_id));
    }
    if let Some(parent_comment_id) = &request.parent_comment_id {
        body.insert("parentCommentId".into(), json!(parent_comment_id));
    }
    if let Some(attachment_id) = &request.attachment_id {
        body.insert("attachmentId".into(), json!(attachment_id));
    }
    if let Some(custom_content_id) = &request.custom_content_id {
        body.insert("customContentId".into(), json!(custom_content_id));
    }
    body.insert(
        "body".into(),
        json!({ "representation": request.representation, "value": request.content }),
    );
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ConfluenceService {
        let config = AppConfig {
            atlassian_host: "https://example.atlassian.net".to_string(),
            atlassian_email: "dev@example.com".to_string(),
            atlassian_api_token: "token".to_string(),
            ..AppConfig::default()
        };
        ConfluenceService::from_config(&config).expect("service should build")
    }

    #[test]
    fn test_v2_and_v1_urls() {
        let confluence = service();
        assert_eq!(
            confluence.v2_url("/pages/123"),
            "https://example.atlassian.net/wiki/api/v2/pages/123"
        );
        assert_eq!(
            confluence.v1_url("/search"),
            "https://example.atlassian.net/wiki/rest/api/search"
        );
    }

    #[test]
    fn test_wiki_suffix_not_doubled() {
        let config = AppConfig {
            confluence_url: Some("https://example.atlassian.net/wiki".to_string()),
            ..AppConfig::default()
        };
        let confluence = ConfluenceService::from_config(&config).expect("service should build");
        assert_eq!(
            confluence.v2_url("/spaces"),
            "https://example.atlassian.net/wiki/api/v2/spaces"
        );
    }

    #[test]
    fn test_paged_query_includes_optionals() {
        let query = paged_query(25, Some("cur123"), Some("SP1"));
        assert!(query.contains(&("limit", "25".to_string())));
        assert!(query.contains(&("space-id", "SP1".to_string())));
        assert!(query.contains(&("cursor", "cur123".to_string())));

        let bare = paged_query(10, None, None);
        assert_eq!(bare, vec![("limit", "10".to_string())]);
    }

    #[test]
    fn test_create_page_body_shape() {
        let body = create_page_body(&CreatePageRequest {
            space_id: "111".to_string(),
            status: "current".to_string(),
            title: "Runbook".to_string(),
            parent_id: None,
            representation: "storage".to_string(),
            content: "<p>hello</p>".to_string(),
        });
        assert_eq!(body["spaceId"], "111");
        assert_eq!(body["body"]["representation"], "storage");
        assert!(body.get("parentId").is_none());
    }

    #[test]
    fn test_update_page_body_includes_version() {
        let body = update_page_body(&UpdatePageRequest {
            page_id: "222".to_string(),
            status: "current".to_string(),
            title: "Runbook".to_string(),
            representation: "storage".to_string(),
            content: "<p>v2</p>".to_string(),
            version: 2,
            version_message: Some("edit".to_string()),
        });
        assert_eq!(body["version"]["number"], 2);
        assert_eq!(body["version"]["message"], "edit");
    }

    #[test]
    fn test_footer_comment_body_targets() {
        let body = footer_comment_body(&CreateFooterCommentRequest {
            page_id: Some("333".to_string()),
            representation: "storage".to_string(),
            content: "nice page".to_string(),
            ..CreateFooterCommentRequest::default()
        });
        assert_eq!(body["pageId"], "333");
        assert_eq!(body["body"]["value"], "nice page");
        assert!(body.get("blogPostId").is_none());
    }
}
