//! Persistence for users, reset grants and todos.
//!
//! Handlers and the auth core only see the [`CredentialStore`] and
//! [`TodoStore`] traits; [`PgStore`] backs them in production and
//! [`MemoryStore`] in tests and `STORE=memory` runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

mod memory;
mod models;
mod postgres;

pub use memory::MemoryStore;
pub use models::{ResetRecord, Todo, TodoPatch, TodoStatus, User};
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with [`StoreError::DuplicateEmail`] when the (normalized) email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str)
    -> Result<(), StoreError>;

    /// Stores a new grant and drops the user's earlier unconsumed ones.
    async fn insert_reset(&self, reset: &ResetRecord) -> Result<(), StoreError>;

    /// Consumes a live grant matching `reset_id` and `token_hash` and writes
    /// `password_hash` to its user as one unit. Returns the user id, or `None`
    /// when no live grant matched (nothing is written in that case).
    async fn consume_reset(
        &self,
        reset_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError>;

    /// Deletes consumed and expired grants.
    async fn purge_resets(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Newest first.
    async fn list_todos(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError>;

    async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError>;

    /// `None` when the todo does not exist or belongs to someone else.
    async fn update_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TodoPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, StoreError>;

    async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
