//! Task operations
//!
//! CRUD, filtering/sorting/pagination, and bulk creation against the
//! `/tasks` endpoints.

use crate::error::Result;
use crate::http::{ApiClient, RequestConfig};
use crate::types::{SortDirection, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

/// Minimal user shape embedded in task payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    /// User id
    pub id: String,
    /// User email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// A task as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task id
    pub id: String,
    /// Short title
    pub title: String,
    /// Longer free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow state
    pub status: TaskStatus,
    /// Priority
    pub priority: TaskPriority,
    /// Due date
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Who created the task
    pub author: UserRef,
    /// Who the task is assigned to
    #[serde(default)]
    pub assignees: Vec<UserRef>,
}

/// Payload for creating a task
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    /// Short title (required)
    pub title: String,
    /// Longer free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial workflow state (server defaults to pending)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Priority (server defaults to medium)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Users to assign
    pub assignee_ids: Vec<String>,
}

impl CreateTask {
    /// Create a payload with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Payload for updating a task; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New workflow state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// New due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Replacement assignee set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<String>>,
}

/// Filters, sorting, and pagination for task listings
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    /// Only tasks in this state
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority
    pub priority: Option<TaskPriority>,
    /// Only tasks assigned to this user
    pub assignee_id: Option<String>,
    /// Only tasks created by this user
    pub author_id: Option<String>,
    /// Free-text search over title and description
    pub search: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
    /// Only tasks due on or after this instant
    pub from_date: Option<DateTime<Utc>>,
    /// Only tasks due on or before this instant
    pub to_date: Option<DateTime<Utc>>,
    /// Field to sort by
    pub sort_by: Option<String>,
    /// Sort direction
    pub sort_direction: Option<SortDirection>,
}

impl TaskFilters {
    /// Create empty filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by workflow state
    #[must_use]
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by priority
    #[must_use]
    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Filter by assignee
    #[must_use]
    pub fn assignee(mut self, user_id: impl Into<String>) -> Self {
        self.assignee_id = Some(user_id.into());
        self
    }

    /// Free-text search
    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    /// Select a result page
    #[must_use]
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    /// Sort by a field
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_direction = Some(direction);
        self
    }

    fn into_request_config(self) -> RequestConfig {
        let mut config = RequestConfig::new();
        if let Some(status) = self.status {
            config = config.query("status", status.as_str());
        }
        if let Some(priority) = self.priority {
            config = config.query("priority", priority.as_str());
        }
        if let Some(assignee_id) = self.assignee_id {
            config = config.query("assigneeId", assignee_id);
        }
        if let Some(author_id) = self.author_id {
            config = config.query("authorId", author_id);
        }
        if let Some(search) = self.search {
            config = config.query("search", search);
        }
        if let Some(page) = self.page {
            config = config.query("page", page.to_string());
        }
        if let Some(limit) = self.limit {
            config = config.query("limit", limit.to_string());
        }
        if let Some(from_date) = self.from_date {
            config = config.query("fromDate", from_date.to_rfc3339());
        }
        if let Some(to_date) = self.to_date {
            config = config.query("toDate", to_date.to_rfc3339());
        }
        if let Some(sort_by) = self.sort_by {
            config = config.query("sortBy", sort_by);
        }
        if let Some(direction) = self.sort_direction {
            config = config.query("sortDirection", direction.as_str());
        }
        config
    }
}

/// Pagination metadata for a task listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total matching tasks
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total pages
    pub total_pages: u32,
    /// Whether a next page exists
    pub has_next: bool,
    /// Whether a previous page exists
    pub has_prev: bool,
}

/// One page of a task listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksPage {
    /// Tasks on this page
    pub tasks: Vec<Task>,
    /// Pagination metadata
    pub pagination: Pagination,
}

/// Result of a bulk create
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResult {
    /// How many tasks were created
    pub created: u32,
    /// The created tasks
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Task endpoints
#[derive(Debug, Clone)]
pub struct TaskApi {
    client: ApiClient,
}

impl TaskApi {
    /// Create the task API over a client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a task
    pub async fn create(&self, task: &CreateTask) -> Result<Task> {
        self.client
            .post("/tasks/new", serde_json::to_value(task)?)
            .await
    }

    /// Create many tasks in one request
    pub async fn bulk_create(&self, tasks: &[CreateTask]) -> Result<BulkCreateResult> {
        self.client
            .post(
                "/tasks/bulk",
                serde_json::json!({ "tasks": serde_json::to_value(tasks)? }),
            )
            .await
    }

    /// List tasks matching the given filters
    pub async fn list(&self, filters: TaskFilters) -> Result<TasksPage> {
        self.client
            .get_with_config("/tasks", filters.into_request_config())
            .await
    }

    /// Fetch one task
    pub async fn get(&self, id: &str) -> Result<Task> {
        self.client.get(&format!("/tasks/{id}")).await
    }

    /// Fetch several tasks concurrently
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<Task>> {
        try_join_all(ids.iter().map(|id| self.get(id))).await
    }

    /// Update a task
    pub async fn update(&self, id: &str, changes: &UpdateTask) -> Result<Task> {
        self.client
            .put(&format!("/tasks/{id}"), serde_json::to_value(changes)?)
            .await
    }

    /// Delete a task
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/tasks/{id}")).await
    }

    /// Move a task to a new workflow state
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        self.update(
            id,
            &UpdateTask {
                status: Some(status),
                ..UpdateTask::default()
            },
        )
        .await
    }

    /// Change a task's priority
    pub async fn set_priority(&self, id: &str, priority: TaskPriority) -> Result<Task> {
        self.update(
            id,
            &UpdateTask {
                priority: Some(priority),
                ..UpdateTask::default()
            },
        )
        .await
    }

    /// Add a user to a task's assignees
    pub async fn add_assignee(&self, task_id: &str, user_id: &str) -> Result<Task> {
        let task = self.get(task_id).await?;
        let mut assignee_ids: Vec<String> =
            task.assignees.into_iter().map(|user| user.id).collect();
        assignee_ids.push(user_id.to_string());

        self.update(
            task_id,
            &UpdateTask {
                assignee_ids: Some(assignee_ids),
                ..UpdateTask::default()
            },
        )
        .await
    }

    /// Remove a user from a task's assignees
    pub async fn remove_assignee(&self, task_id: &str, user_id: &str) -> Result<Task> {
        let task = self.get(task_id).await?;
        let assignee_ids: Vec<String> = task
            .assignees
            .into_iter()
            .map(|user| user.id)
            .filter(|id| id != user_id)
            .collect();

        self.update(
            task_id,
            &UpdateTask {
                assignee_ids: Some(assignee_ids),
                ..UpdateTask::default()
            },
        )
        .await
    }

    /// List tasks matching a search query
    pub async fn search(&self, query: &str, filters: TaskFilters) -> Result<TasksPage> {
        self.list(filters.search(query)).await
    }

    /// List unfinished tasks whose deadline has passed
    pub async fn overdue(&self) -> Result<TasksPage> {
        let config = RequestConfig::new()
            .query("toDate", Utc::now().to_rfc3339())
            .query(
                "status",
                format!(
                    "{},{}",
                    TaskStatus::Pending.as_str(),
                    TaskStatus::InProgress.as_str()
                ),
            );
        self.client.get_with_config("/tasks", config).await
    }
}
