//! Forgot-password flow: one-time reset grants delivered as links.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::credentials::Credentials;
use super::notifier::ResetNotifier;
use crate::config::bounded_lifetime;
use crate::error::{AppError, AppResult};
use crate::store::{CredentialStore, ResetRecord};
use crate::utils::{digest_secret, generate_secret};

#[derive(Clone)]
pub struct ResetFlow {
    store: Arc<dyn CredentialStore>,
    credentials: Credentials,
    notifier: Arc<dyn ResetNotifier>,
    lifetime: Duration,
    link_base: String,
}

impl ResetFlow {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        credentials: Credentials,
        notifier: Arc<dyn ResetNotifier>,
        lifetime: StdDuration,
        link_base: impl Into<String>,
    ) -> Self {
        Self {
            store,
            credentials,
            notifier,
            lifetime: bounded_lifetime(lifetime),
            link_base: link_base.into(),
        }
    }

    pub fn reset_link(&self, reset_id: Uuid, secret: &str) -> String {
        let sep = if self.link_base.contains('?') { '&' } else { '?' };
        format!("{}{}id={}&token={}", self.link_base, sep, reset_id, secret)
    }

    /// Issues a grant when `email` belongs to an account and hands the link to
    /// the notifier in the background. Returns `Ok(())` either way; callers
    /// cannot tell the cases apart.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.credentials.find_by_email(email).await? else {
            tracing::debug!("reset requested for an unregistered email");
            return Ok(());
        };

        let secret = generate_secret();
        let now = Utc::now();
        let record = ResetRecord {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: digest_secret(&secret),
            expires_at: now + self.lifetime,
            consumed_at: None,
            created_at: now,
        };
        self.store.insert_reset(&record).await?;

        let link = self.reset_link(record.id, &secret);
        tracing::info!("reset grant {} issued for user {}", record.id, user.id);

        // response time must not depend on whether delivery happens
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_reset_link(&user, &link).await {
                tracing::error!("failed to deliver reset link for user {}: {}", user.id, e);
            }
        });

        Ok(())
    }

    /// Consumes the grant and sets the new password in one step.
    pub async fn reset_password(
        &self,
        reset_id: &str,
        reset_token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let Ok(reset_id) = Uuid::parse_str(reset_id) else {
            tracing::debug!("reset attempted with malformed id");
            return Err(AppError::InvalidOrExpiredToken);
        };

        let password_hash = self.credentials.hash(new_password).await?;
        let consumed = self
            .store
            .consume_reset(reset_id, &digest_secret(reset_token), &password_hash, Utc::now())
            .await?;

        match consumed {
            Some(user_id) => {
                tracing::info!("password reset completed for user {} via grant {}", user_id, reset_id);
                Ok(())
            }
            None => {
                tracing::debug!("reset grant {} unknown, used, expired or secret mismatch", reset_id);
                Err(AppError::InvalidOrExpiredToken)
            }
        }
    }

    pub async fn purge_expired(&self) -> AppResult<u64> {
        Ok(self.store.purge_resets(Utc::now()).await?)
    }

    pub fn spawn_purger(&self, every: StdDuration) -> JoinHandle<()> {
        let flow = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match flow.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!("purged {} stale reset grants", n),
                    Err(e) => tracing::warn!("reset grant purge failed: {}", e),
                }
            }
        })
    }
}
