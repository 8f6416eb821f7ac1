use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{CredentialStore, User};
use crate::utils::{hash_password, normalize_email, verify_password};

/// Password-based credential checks on top of a [`CredentialStore`].
///
/// bcrypt work runs on the blocking pool so a burst of logins does not stall
/// the runtime's worker threads.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
    cost: u32,
    // verified against when the email is unknown so both login paths pay one bcrypt check
    dummy_hash: Arc<str>,
}

impl Credentials {
    pub fn new(store: Arc<dyn CredentialStore>, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let dummy_hash = hash_password("not-a-real-password", cost)?;
        Ok(Self {
            store,
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn hash(&self, plaintext: &str) -> AppResult<String> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || hash_password(&plaintext, cost)).await??;
        Ok(hashed)
    }

    async fn check(&self, plaintext: &str, hash: &str) -> AppResult<bool> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        let ok = tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash)).await??;
        Ok(ok)
    }

    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        // cheap pre-check; the unique index still decides races
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: display_name.trim().to_string(),
            email,
            password_hash: self.hash(password).await?,
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await?;

        tracing::info!("registered user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.store.find_user_by_email(&normalize_email(email)).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.store.find_user_by_id(id).await?)
    }

    pub async fn verify_password(&self, user: &User, candidate: &str) -> AppResult<bool> {
        self.check(candidate, &user.password_hash).await
    }

    /// Resolves an email/password pair to its user. Unknown email and wrong
    /// password produce the same error; only the log tells them apart.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        match self.find_by_email(email).await? {
            Some(user) => {
                if self.verify_password(&user, password).await? {
                    Ok(user)
                } else {
                    tracing::debug!("login rejected for user {}: wrong password", user.id);
                    Err(AppError::InvalidCredentials)
                }
            }
            None => {
                self.check(password, &self.dummy_hash).await?;
                tracing::debug!("login rejected: no account for submitted email");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub async fn update_password(&self, user: &User, new_password: &str) -> AppResult<()> {
        let hashed = self.hash(new_password).await?;
        self.store.set_password_hash(user.id, &hashed).await?;
        tracing::info!("password updated for user {}", user.id);
        Ok(())
    }
}
