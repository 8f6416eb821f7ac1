use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A password reset grant. `token_hash` is the SHA-256 of the secret sent to the user.
#[derive(Debug, Clone, FromRow)]
pub struct ResetRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ResetRecord {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::ToDo => "To Do",
            TodoStatus::InProgress => "In Progress",
            TodoStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "To Do" => Some(TodoStatus::ToDo),
            "In Progress" => Some(TodoStatus::InProgress),
            "Completed" => Some(TodoStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Todo {
    // the web client keys rows, edits and deletes on `_id`
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: TodoStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a todo edit may touch; `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<TodoStatus>,
}

impl TodoPatch {
    pub fn apply(&self, todo: &mut Todo, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(status) = self.completed {
            todo.completed = status;
        }
        todo.updated_at = now;
    }
}

/// Row shape of the `todos` table; status is stored as its display text.
#[derive(Debug, FromRow)]
pub(crate) struct TodoRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = sqlx::Error;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let completed = TodoStatus::parse(&row.status).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown todo status {:?}", row.status).into())
        })?;
        Ok(Todo {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
