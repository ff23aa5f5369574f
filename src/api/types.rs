//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskDraft};

/// Task identifier as clients send it: the frontend uses strings, scripted
/// clients often send numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Text(String),
    Number(i64),
}

impl IdField {
    pub fn into_string(self) -> String {
        match self {
            IdField::Text(s) => s,
            IdField::Number(n) => n.to_string(),
        }
    }
}

/// Body of `POST /api/task` and `PUT /api/task`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPayload {
    /// Only used by edits
    #[serde(default)]
    pub id: Option<IdField>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl From<TaskPayload> for TaskDraft {
    fn from(p: TaskPayload) -> Self {
        Self {
            id: p.id.map(IdField::into_string).unwrap_or_default(),
            date: p.date,
            title: p.title,
            comment: p.comment,
            repeat: p.repeat,
        }
    }
}

/// A task on the wire. The id is rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResponse {
    pub id: String,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id.to_string(),
            date: t.date,
            title: t.title,
            comment: t.comment,
            repeat: t.repeat,
        }
    }
}

/// Response after creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// `GET /api/tasks` response.
#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<TaskResponse>,
}

/// `{}` acknowledgement for edits, completion and deletion.
#[derive(Debug, Clone, Serialize)]
pub struct EmptyResponse {}

/// Error body shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query carrying a task id (`?id=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: String,
}

/// Query for `GET /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// Query for `GET /api/nextdate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextDateQuery {
    /// Reference date; today when omitted
    #[serde(default)]
    pub now: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub repeat: String,
}

/// Sign-in request.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub password: String,
}

/// Sign-in response containing a JWT for API authentication.
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub token: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub persistent_store: bool,
    pub auth_required: bool,
}
