//! Confluence tool definitions
//!
//! Tools returning page bodies or comment content carry `pii: true`; space
//! and label listings are structural metadata and skip the redaction scan.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use super::{
    ArgKind, ArgSpec, ToolAccess, ToolGroup, ToolSpec, opt_str, opt_u32, require_i64, require_str,
};
use crate::error::Result;
use crate::services::Services;
use crate::services::confluence::{
    CreateFooterCommentRequest, CreatePageRequest, DEFAULT_LIMIT, UpdatePageRequest,
};

pub(super) static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "search_confluence",
        description: "Search Confluence content using a CQL query",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: true,
        args: &[
            ArgSpec {
                name: "query",
                kind: ArgKind::String,
                required: true,
                description: "The Confluence Query Language (CQL) query to search for content",
            },
            ArgSpec {
                name: "limit",
                kind: ArgKind::Integer,
                required: false,
                description: "Maximum number of results to return (default: 25)",
            },
            ArgSpec {
                name: "start",
                kind: ArgKind::Integer,
                required: false,
                description: "Starting index for pagination",
            },
        ],
        handler: search_content,
    },
    ToolSpec {
        name: "search_confluence_pages_by_title",
        description: "Search Confluence pages by title",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: false,
        args: &[
            ArgSpec {
                name: "title",
                kind: ArgKind::String,
                required: false,
                description: "Title to search for",
            },
            ArgSpec {
                name: "spaceId",
                kind: ArgKind::String,
                required: false,
                description: "Optional space ID to limit search",
            },
            ArgSpec {
                name: "limit",
                kind: ArgKind::Integer,
                required: false,
                description: "Maximum number of results to return (default: 25)",
            },
            ArgSpec {
                name: "cursor",
                kind: ArgKind::String,
                required: false,
                description: "Cursor for pagination",
            },
        ],
        handler: search_pages_by_title,
    },
    ToolSpec {
        name: "get_confluence_space",
        description: "Retrieve a Confluence space by its ID or key",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: false,
        args: &[ArgSpec {
            name: "spaceIdOrKey",
            kind: ArgKind::String,
            required: true,
            description: "The ID or key of the Confluence space to retrieve",
        }],
        handler: get_space,
    },
    ToolSpec {
        name: "get_confluence_spaces",
        description: "List Confluence spaces",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: false,
        args: &[
            ArgSpec {
                name: "limit",
                kind: ArgKind::Integer,
                required: false,
                description: "Maximum number of results to return (default: 25)",
            },
            ArgSpec {
                name: "cursor",
                kind: ArgKind::String,
                required: false,
                description: "Cursor for pagination",
            },
        ],
        handler: get_spaces,
    },
    ToolSpec {
        name: "get_confluence_content",
        description: "Retrieve Confluence content by ID, including its storage-format body",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: true,
        args: &[ArgSpec {
            name: "contentId",
            kind: ArgKind::String,
            required: true,
            description: "The ID of the Confluence content to retrieve",
        }],
        handler: get_content,
    },
    ToolSpec {
        name: "get_confluence_pages",
        description: "List pages in a Confluence space",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: false,
        args: &[
            ArgSpec {
                name: "spaceId",
                kind: ArgKind::String,
                required: true,
                description: "The ID of the Confluence space",
            },
            ArgSpec {
                name: "limit",
                kind: ArgKind::Integer,
                required: false,
                description: "Maximum number of results to return (default: 25)",
            },
            ArgSpec {
                name: "cursor",
                kind: ArgKind::String,
                required: false,
                description: "Cursor for pagination",
            },
        ],
        handler: get_pages,
    },
    ToolSpec {
        name: "get_confluence_pages_by_label",
        description: "List Confluence pages carrying a label",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: false,
        args: &[
            ArgSpec {
                name: "label",
                kind: ArgKind::String,
                required: true,
                description: "The label to search for",
            },
            ArgSpec {
                name: "spaceId",
                kind: ArgKind::String,
                required: false,
                description: "Optional space ID to limit search",
            },
            ArgSpec {
                name: "limit",
                kind: ArgKind::Integer,
                required: false,
                description: "Maximum number of results to return (default: 25)",
            },
            ArgSpec {
                name: "cursor",
                kind: ArgKind::String,
                required: false,
                description: "Cursor for pagination",
            },
        ],
        handler: get_pages_by_label,
    },
    ToolSpec {
        name: "get_confluence_page_inline_comments",
        description: "List inline comments on a Confluence page",
        group: ToolGroup::Confluence,
        access: ToolAccess::Read,
        pii: true,
        args: &[
            ArgSpec {
                name: "pageId",
                kind: ArgKind::String,
                required: true,
                description: "The ID of the page",
            },
            ArgSpec {
                name: "limit",
                kind: ArgKind::Integer,
                required: false,
                description: "Maximum number of results to return (default: 25)",
            },
            ArgSpec {
                name: "cursor",
                kind: ArgKind::String,
                required: false,
                description: "Cursor for pagination",
            },
        ],
        handler: get_page_inline_comments,
    },
    ToolSpec {
        name: "confluence_create_page",
        description: "Create a new Confluence page",
        group: ToolGroup::Confluence,
        access: ToolAccess::Write,
        pii: true,
        args: &[
            ArgSpec {
                name: "spaceId",
                kind: ArgKind::String,
                required: true,
                description: "The ID of the space where the page will be created",
            },
            ArgSpec {
                name: "title",
                kind: ArgKind::String,
                required: true,
                description: "The title of the page",
            },
            ArgSpec {
                name: "content",
                kind: ArgKind::String,
                required: true,
                description: "The content of the page in Confluence storage format",
            },
            ArgSpec {
                name: "parentId",
                kind: ArgKind::String,
                required: false,
                description: "The ID of the parent page (optional)",
            },
            ArgSpec {
                name: "status",
                kind: ArgKind::String,
                required: false,
                description: "The status of the page: current or draft (default: current)",
            },
            ArgSpec {
                name: "representation",
                kind: ArgKind::String,
                required: false,
                description: "The content representation format (default: storage)",
            },
        ],
        handler: create_page,
    },
    ToolSpec {
        name: "confluence_update_page",
        description: "Update the title and content of an existing Confluence page",
        group: ToolGroup::Confluence,
        access: ToolAccess::Write,
        pii: true,
        args: &[
            ArgSpec {
                name: "pageId",
                kind: ArgKind::String,
                required: true,
                description: "The ID of the page to update",
            },
            ArgSpec {
                name: "title",
                kind: ArgKind::String,
                required: true,
                description: "The new title of the page",
            },
            ArgSpec {
                name: "content",
                kind: ArgKind::String,
                required: true,
                description: "The new content of the page in Confluence storage format",
            },
            ArgSpec {
                name: "version",
                kind: ArgKind::Integer,
                required: true,
                description: "The next version number of the page (required for updates)",
            },
            ArgSpec {
                name: "status",
                kind: ArgKind::String,
                required: false,
                description: "The status of the page: current or draft (default: current)",
            },
            ArgSpec {
                name: "versionMessage",
                kind: ArgKind::String,
                required: false,
                description: "Optional message describing the change",
            },
        ],
        handler: update_page,
    },
    ToolSpec {
        name: "update_confluence_page_title",
        description: "Update only the title of a Confluence page",
        group: ToolGroup::Confluence,
        access: ToolAccess::Write,
        pii: false,
        args: &[
            ArgSpec {
                name: "pageId",
                kind: ArgKind::String,
                required: true,
                description: "The ID of the page to update",
            },
            ArgSpec {
                name: "title",
                kind: ArgKind::String,
                required: true,
                description: "The new title for the page",
            },
            ArgSpec {
                name: "status",
                kind: ArgKind::String,
                required: false,
                description: "The status of the page (default: current)",
            },
        ],
        handler: update_page_title,
    },
    ToolSpec {
        name: "create_confluence_footer_comment",
        description: "Create a footer comment on a page, blog post, or another comment",
        group: ToolGroup::Confluence,
        access: ToolAccess::Write,
        pii: true,
        args: &[
            ArgSpec {
                name: "content",
                kind: ArgKind::String,
                required: true,
                description: "The content of the comment",
            },
            ArgSpec {
                name: "pageId",
                kind: ArgKind::String,
                required: false,
                description: "The ID of the page to comment on",
            },
            ArgSpec {
                name: "blogPostId",
                kind: ArgKind::String,
                required: false,
                description: "The ID of the blog post to comment on",
            },
            ArgSpec {
                name: "parentCommentId",
                kind: ArgKind::String,
                required: false,
                description: "The ID of the parent comment (for replies)",
            },
            ArgSpec {
                name: "attachmentId",
                kind: ArgKind::String,
                required: false,
                description: "The ID of the attachment to comment on",
            },
            ArgSpec {
                name: "customContentId",
                kind: ArgKind::String,
                required: false,
                description: "The ID of the custom content to comment on",
            },
            ArgSpec {
                name: "representation",
                kind: ArgKind::String,
                required: false,
                description: "The content representation format (default: storage)",
            },
        ],
        handler: create_footer_comment,
    },
    ToolSpec {
        name: "confluence_delete_page",
        description: "Delete a Confluence page",
        group: ToolGroup::Confluence,
        access: ToolAccess::Write,
        pii: false,
        args: &[ArgSpec {
            name: "pageId",
            kind: ArgKind::String,
            required: true,
            description: "The ID of the page to delete",
        }],
        handler: delete_page,
    },
];

fn search_content(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        // CQL with embedded newlines is rejected by the search endpoint
        let query = require_str(&args, "query")?.replace('\n', "");
        let limit = opt_u32(&args, "limit").unwrap_or(DEFAULT_LIMIT);
        let start = opt_u32(&args, "start").unwrap_or(0);
        services.confluence.search_content(&query, limit, start).await
    })
}

fn search_pages_by_title(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let title = opt_str(&args, "title");
        let space_id = opt_str(&args, "spaceId");
        let limit = opt_u32(&args, "limit").unwrap_or(DEFAULT_LIMIT);
        let cursor = opt_str(&args, "cursor");
        services
            .confluence
            .search_pages_by_title(title.as_deref(), space_id.as_deref(), limit, cursor.as_deref())
            .await
    })
}

fn get_space(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let space_id_or_key = require_str(&args, "spaceIdOrKey")?;
        services.confluence.get_space(&space_id_or_key).await
    })
}

fn get_spaces(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let limit = opt_u32(&args, "limit").unwrap_or(DEFAULT_LIMIT);
        let cursor = opt_str(&args, "cursor");
        services.confluence.get_spaces(limit, cursor.as_deref()).await
    })
}

fn get_content(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let content_id = require_str(&args, "contentId")?;
        services.confluence.get_page(&content_id, "storage").await
    })
}

fn get_pages(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let space_id = require_str(&args, "spaceId")?;
        let limit = opt_u32(&args, "limit").unwrap_or(DEFAULT_LIMIT);
        let cursor = opt_str(&args, "cursor");
        services
            .confluence
            .get_pages_in_space(&space_id, limit, cursor.as_deref())
            .await
    })
}

fn get_pages_by_label(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let label = require_str(&args, "label")?;
        let space_id = opt_str(&args, "spaceId");
        let limit = opt_u32(&args, "limit").unwrap_or(DEFAULT_LIMIT);
        let cursor = opt_str(&args, "cursor");
        services
            .confluence
            .get_pages_by_label(&label, space_id.as_deref(), limit, cursor.as_deref())
            .await
    })
}

fn get_page_inline_comments(
    services: Arc<Services>,
    args: Value,
) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let page_id = require_str(&args, "pageId")?;
        let limit = opt_u32(&args, "limit").unwrap_or(DEFAULT_LIMIT);
        let cursor = opt_str(&args, "cursor");
        services
            .confluence
            .get_page_inline_comments(&page_id, limit, cursor.as_deref())
            .await
    })
}

fn create_page(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let request = CreatePageRequest {
            space_id: require_str(&args, "spaceId")?,
            title: require_str(&args, "title")?,
            content: require_str(&args, "content")?,
            parent_id: opt_str(&args, "parentId"),
            status: opt_str(&args, "status").unwrap_or_else(|| "current".to_string()),
            representation: opt_str(&args, "representation")
                .unwrap_or_else(|| "storage".to_string()),
        };
        services.confluence.create_page(request).await
    })
}

fn update_page(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let request = UpdatePageRequest {
            page_id: require_str(&args, "pageId")?,
            title: require_str(&args, "title")?,
            content: require_str(&args, "content")?,
            version: require_i64(&args, "version")?,
            status: opt_str(&args, "status").unwrap_or_else(|| "current".to_string()),
            representation: opt_str(&args, "representation")
                .unwrap_or_else(|| "storage".to_string()),
            version_message: opt_str(&args, "versionMessage"),
        };
        services.confluence.update_page(request).await
    })
}

fn update_page_title(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let page_id = require_str(&args, "pageId")?;
        let title = require_str(&args, "title")?;
        let status = opt_str(&args, "status").unwrap_or_else(|| "current".to_string());
        services
            .confluence
            .update_page_title(&page_id, &title, &status)
            .await
    })
}

fn create_footer_comment(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let request = CreateFooterCommentRequest {
            content: require_str(&args, "content")?,
            page_id: opt_str(&args, "pageId"),
            blog_post_id: opt_str(&args, "blogPostId"),
            parent_comment_id: opt_str(&args, "parentCommentId"),
            attachment_id: opt_str(&args, "attachmentId"),
            custom_content_id: opt_str(&args, "customContentId"),
            representation: opt_str(&args, "representation")
                .unwrap_or_else(|| "storage".to_string()),
        };
        services.confluence.create_footer_comment(request).await
    })
}

fn delete_page(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let page_id = require_str(&args, "pageId")?;
        services.confluence.delete_page(&page_id).await
    })
}
