use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{CredentialStore, ResetRecord, StoreError, Todo, TodoPatch, TodoStore, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    resets: HashMap<Uuid, ResetRecord>,
    todos: HashMap<Uuid, Todo>,
}

/// Process-local store. One mutex covers every table so multi-record
/// operations apply as a unit, like a transaction would.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Outstanding grants for a user, consumed ones included.
    pub fn resets_for(&self, user_id: Uuid) -> Vec<ResetRecord> {
        self.lock()
            .resets
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateEmail);
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        if let Some(user) = self.lock().users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn insert_reset(&self, reset: &ResetRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner
            .resets
            .retain(|_, r| r.user_id != reset.user_id || r.consumed_at.is_some());
        inner.resets.insert(reset.id, reset.clone());
        Ok(())
    }

    async fn consume_reset(
        &self,
        reset_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut inner = self.lock();

        let user_id = match inner.resets.get_mut(&reset_id) {
            Some(record) if record.is_live(now) && record.token_hash == token_hash => {
                record.consumed_at = Some(now);
                record.user_id
            }
            _ => return Ok(None),
        };

        if let Some(user) = inner.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
        }
        inner
            .resets
            .retain(|_, r| r.user_id != user_id || r.consumed_at.is_some());

        Ok(Some(user_id))
    }

    async fn purge_resets(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let before = inner.resets.len();
        inner.resets.retain(|_, r| r.is_live(now));
        Ok((before - inner.resets.len()) as u64)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todos(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let mut todos: Vec<Todo> = self
            .lock()
            .todos
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        self.lock().todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn update_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TodoPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.lock();
        match inner.todos.get_mut(&id) {
            Some(todo) if todo.owner_id == owner_id => {
                patch.apply(todo, now);
                Ok(Some(todo.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        match inner.todos.get(&id) {
            Some(todo) if todo.owner_id == owner_id => {
                inner.todos.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
