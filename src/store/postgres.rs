use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::TodoRow;
use super::{CredentialStore, ResetRecord, StoreError, Todo, TodoPatch, TodoStore, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    /// `email` must already be normalized; the predicate matches the
    /// `LOWER(email)` unique index.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE LOWER(email) = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_reset(&self, reset: &ResetRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_resets WHERE user_id = $1 AND consumed_at IS NULL")
            .bind(reset.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO password_resets (id, user_id, token_hash, expires_at, consumed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reset.id)
        .bind(reset.user_id)
        .bind(&reset.token_hash)
        .bind(reset.expires_at)
        .bind(reset.consumed_at)
        .bind(reset.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn consume_reset(
        &self,
        reset_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes concurrent attempts on one grant;
        // the loser re-evaluates the predicate and sees consumed_at set.
        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE password_resets
            SET consumed_at = $3
            WHERE id = $1
              AND token_hash = $2
              AND consumed_at IS NULL
              AND expires_at > $3
            RETURNING user_id
            "#,
        )
        .bind(reset_id)
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM password_resets WHERE user_id = $1 AND consumed_at IS NULL")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user_id))
    }

    async fn purge_resets(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM password_resets WHERE consumed_at IS NOT NULL OR expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_todos(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, updated_at
            FROM todos
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let todos = rows
            .into_iter()
            .map(Todo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    async fn insert_todo(&self, todo: &Todo) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, owner_id, title, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(todo.id)
        .bind(todo.owner_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed.as_str())
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TodoPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                updated_at = $6
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.completed.map(|s| s.as_str()))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::try_from).transpose()?)
    }

    async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
