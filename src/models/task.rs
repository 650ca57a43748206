use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    #[serde(rename = "to-do")]
    #[sqlx(rename = "to-do")]
    ToDo,
    /// Task is currently being worked on.
    #[serde(rename = "in-progress")]
    #[sqlx(rename = "in-progress")]
    InProgress,
    /// Task is completed.
    #[serde(rename = "done")]
    #[sqlx(rename = "done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to-do",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| status_error("invalid_status", "Status must be to-do, in-progress, done"))
    }
}

fn status_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Field rule shared by every payload that carries a status string.
pub fn validate_status(status: &str) -> Result<(), ValidationError> {
    if status.trim().is_empty() {
        return Err(status_error("required", "Status is required!"));
    }
    TaskStatus::from_str(status).map(|_| ())
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required!"))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub desc: Option<String>,
}

/// Full replacement of a task's editable fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskUpdateInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required!"))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub desc: Option<String>,

    /// Kept as a string so an unknown value is a field error, not a parse failure.
    #[serde(default)]
    #[validate(custom = "validate_status")]
    pub status: String,
}

/// Payload of `PUT /tasks/status/{id}`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskStatusInput {
    #[serde(default)]
    #[validate(custom = "validate_status")]
    pub status: String,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    /// Owner of the task. Set at creation and never changed.
    pub user_id: Uuid,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents query parameters for filtering the caller's tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
}

/// Fields written by a full task update.
#[derive(Debug, Clone)]
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl TaskChanges {
    pub fn apply(self, task: &mut Task) {
        task.title = self.title;
        task.description = self.description;
        task.status = self.status;
        task.updated_at = Utc::now();
    }
}

impl TryFrom<TaskUpdateInput> for TaskChanges {
    type Error = ValidationError;

    fn try_from(input: TaskUpdateInput) -> Result<Self, Self::Error> {
        Ok(Self {
            status: input.status.parse()?,
            title: input.title,
            description: input.desc.unwrap_or_default(),
        })
    }
}

impl Task {
    /// Creates a new `Task` owned by `owner`, in the `to-do` state.
    pub fn new(input: TaskInput, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.desc.unwrap_or_default(),
            user_id: owner,
            status: TaskStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
