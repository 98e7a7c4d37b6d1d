//! Jira tool definitions

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use super::{
    ArgKind, ArgSpec, ToolAccess, ToolGroup, ToolSpec, opt_str, opt_string_vec, opt_u32,
    require_str,
};
use crate::error::Result;
use crate::services::Services;
use crate::services::jira::{CreateIssueRequest, DEFAULT_SEARCH_MAX_RESULTS, UpdateIssueRequest};

pub(super) static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "search_jira_issues",
        description: "Search for Jira issues using a JQL query",
        group: ToolGroup::Jira,
        access: ToolAccess::Read,
        pii: false,
        args: &[
            ArgSpec {
                name: "jql",
                kind: ArgKind::String,
                required: true,
                description: "The JQL query to search for issues",
            },
            ArgSpec {
                name: "maxResults",
                kind: ArgKind::Integer,
                required: false,
                description: "The maximum number of results to return (default: 50)",
            },
        ],
        handler: search_issues,
    },
    ToolSpec {
        name: "get_jira_issue",
        description: "Retrieve a Jira issue by its key",
        group: ToolGroup::Jira,
        access: ToolAccess::Read,
        pii: false,
        args: &[ArgSpec {
            name: "issueKey",
            kind: ArgKind::String,
            required: true,
            description: "The key of the Jira issue to retrieve (e.g., PROJECT-123)",
        }],
        handler: get_issue,
    },
    ToolSpec {
        name: "jira_create_issue",
        description: "Create a new Jira issue",
        group: ToolGroup::Jira,
        access: ToolAccess::Write,
        pii: false,
        args: &[
            ArgSpec {
                name: "project",
                kind: ArgKind::String,
                required: true,
                description: "The project key where the issue will be created",
            },
            ArgSpec {
                name: "summary",
                kind: ArgKind::String,
                required: true,
                description: "The summary/title of the issue",
            },
            ArgSpec {
                name: "issueType",
                kind: ArgKind::String,
                required: true,
                description: "The type of issue (e.g., Bug, Task, Story)",
            },
            ArgSpec {
                name: "description",
                kind: ArgKind::String,
                required: false,
                description: "The description of the issue",
            },
            ArgSpec {
                name: "priority",
                kind: ArgKind::String,
                required: false,
                description: "The priority of the issue",
            },
            ArgSpec {
                name: "assignee",
                kind: ArgKind::String,
                required: false,
                description: "The username of the assignee",
            },
            ArgSpec {
                name: "labels",
                kind: ArgKind::StringArray,
                required: false,
                description: "Array of labels to add to the issue",
            },
            ArgSpec {
                name: "components",
                kind: ArgKind::StringArray,
                required: false,
                description: "Array of component names",
            },
        ],
        handler: create_issue,
    },
    ToolSpec {
        name: "jira_update_issue",
        description: "Update fields of an existing Jira issue",
        group: ToolGroup::Jira,
        access: ToolAccess::Write,
        pii: false,
        args: &[
            ArgSpec {
                name: "issueKey",
                kind: ArgKind::String,
                required: true,
                description: "The key of the issue to update (e.g., PROJECT-123)",
            },
            ArgSpec {
                name: "summary",
                kind: ArgKind::String,
                required: false,
                description: "The new summary/title of the issue",
            },
            ArgSpec {
                name: "description",
                kind: ArgKind::String,
                required: false,
                description: "The new description of the issue",
            },
            ArgSpec {
                name: "priority",
                kind: ArgKind::String,
                required: false,
                description: "The new priority of the issue",
            },
            ArgSpec {
                name: "assignee",
                kind: ArgKind::String,
                required: false,
                description: "The new assignee username",
            },
            ArgSpec {
                name: "labels",
                kind: ArgKind::StringArray,
                required: false,
                description: "Array of labels to set on the issue",
            },
        ],
        handler: update_issue,
    },
    ToolSpec {
        name: "jira_add_comment",
        description: "Add a comment to a Jira issue",
        group: ToolGroup::Jira,
        access: ToolAccess::Write,
        pii: false,
        args: &[
            ArgSpec {
                name: "issueKey",
                kind: ArgKind::String,
                required: true,
                description: "The key of the issue to add a comment to (e.g., PROJECT-123)",
            },
            ArgSpec {
                name: "comment",
                kind: ArgKind::String,
                required: true,
                description: "The comment text to add",
            },
        ],
        handler: add_comment,
    },
    ToolSpec {
        name: "jira_transition_issue",
        description: "Transition a Jira issue to a new workflow state",
        group: ToolGroup::Jira,
        access: ToolAccess::Write,
        pii: false,
        args: &[
            ArgSpec {
                name: "issueKey",
                kind: ArgKind::String,
                required: true,
                description: "The key of the issue to transition (e.g., PROJECT-123)",
            },
            ArgSpec {
                name: "transitionId",
                kind: ArgKind::String,
                required: true,
                description: "The ID of the transition to perform",
            },
            ArgSpec {
                name: "comment",
                kind: ArgKind::String,
                required: false,
                description: "Optional comment to add during transition",
            },
        ],
        handler: transition_issue,
    },
    ToolSpec {
        name: "jira_get_transitions",
        description: "List the transitions currently available on a Jira issue",
        group: ToolGroup::Jira,
        access: ToolAccess::Read,
        pii: false,
        args: &[ArgSpec {
            name: "issueKey",
            kind: ArgKind::String,
            required: true,
            description: "The key of the issue to get transitions for (e.g., PROJECT-123)",
        }],
        handler: get_transitions,
    },
    ToolSpec {
        name: "jira_get_all_projects",
        description: "List all Jira projects visible to the configured account",
        group: ToolGroup::Jira,
        access: ToolAccess::Read,
        pii: false,
        args: &[],
        handler: get_all_projects,
    },
];

fn search_issues(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        // JQL with embedded newlines is rejected by Jira
        let jql = require_str(&args, "jql")?.replace('\n', "");
        let max_results = opt_u32(&args, "maxResults").unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
        services.jira.search_issues(&jql, max_results).await
    })
}

fn get_issue(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let issue_key = require_str(&args, "issueKey")?;
        services.jira.get_issue(&issue_key).await
    })
}

fn create_issue(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let request = CreateIssueRequest {
            project: require_str(&args, "project")?,
            summary: require_str(&args, "summary")?,
            issue_type: require_str(&args, "issueType")?,
            description: opt_str(&args, "description"),
            priority: opt_str(&args, "priority"),
            assignee: opt_str(&args, "assignee"),
            labels: opt_string_vec(&args, "labels"),
            components: opt_string_vec(&args, "components"),
        };
        services.jira.create_issue(request).await
    })
}

fn update_issue(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let issue_key = require_str(&args, "issueKey")?;
        let request = UpdateIssueRequest {
            summary: opt_str(&args, "summary"),
            description: opt_str(&args, "description"),
            priority: opt_str(&args, "priority"),
            assignee: opt_str(&args, "assignee"),
            labels: opt_string_vec(&args, "labels"),
        };
        services.jira.update_issue(&issue_key, request).await
    })
}

fn add_comment(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let issue_key = require_str(&args, "issueKey")?;
        let comment = require_str(&args, "comment")?;
        services.jira.add_comment(&issue_key, &comment).await
    })
}

fn transition_issue(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let issue_key = require_str(&args, "issueKey")?;
        let transition_id = require_str(&args, "transitionId")?;
        let comment = opt_str(&args, "comment");
        services
            .jira
            .transition_issue(&issue_key, &transition_id, comment.as_deref())
            .await
    })
}

fn get_transitions(services: Arc<Services>, args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move {
        let issue_key = require_str(&args, "issueKey")?;
        services.jira.get_transitions(&issue_key).await
    })
}

fn get_all_projects(services: Arc<Services>, _args: Value) -> BoxFuture<'static, Result<Value>> {
    Box::pin(async move { services.jira.get_projects().await })
}
