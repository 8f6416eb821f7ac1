//! Delivery of password reset links.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use crate::store::User;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_link(&self, user: &User, link: &str) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    /// `None` unless host, credentials and sender are all set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            smtp_host: std::env::var("SMTP_HOST").ok()?,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME").ok()?,
            smtp_password: std::env::var("SMTP_PASSWORD").ok()?,
            from_email: std::env::var("FROM_EMAIL").ok()?,
            from_name: std::env::var("FROM_NAME").unwrap_or_else(|_| "Taskboard".to_string()),
        })
    }
}

pub struct SmtpNotifier {
    config: EmailConfig,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { config, mailer })
    }
}

#[async_trait]
impl ResetNotifier for SmtpNotifier {
    async fn send_reset_link(&self, user: &User, link: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(format!("{} <{}>", self.config.from_name, self.config.from_email).parse()?)
            .to(user.email.parse()?)
            .subject("Reset your password")
            .header(ContentType::TEXT_HTML)
            .body(render_reset_email(&user.name, link))?;

        self.mailer.send(email).await?;
        tracing::info!("reset email sent to user {}", user.id);
        Ok(())
    }
}

/// Writes the link to the log instead of mailing it; used when SMTP is not configured.
pub struct LogNotifier;

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset_link(&self, user: &User, link: &str) -> Result<(), NotifyError> {
        tracing::info!("[reset link] user {} <{}>: {}", user.id, user.email, link);
        Ok(())
    }
}

pub fn notifier_from_env() -> Arc<dyn ResetNotifier> {
    match EmailConfig::from_env() {
        Some(config) => match SmtpNotifier::new(config) {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                tracing::warn!("Failed to initialize SMTP notifier: {}. Logging reset links instead.", e);
                Arc::new(LogNotifier)
            }
        },
        None => {
            tracing::info!("SMTP not configured, reset links will be logged");
            Arc::new(LogNotifier)
        }
    }
}

pub fn render_reset_email(name: &str, link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Reset your password</title>
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="color: #333;">Password Reset Request</h1>
    <p>Hi {name},</p>
    <p>We received a request to reset your password. Use the button below to choose a new one:</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{link}" style="background-color: #2196F3; color: white; padding: 14px 28px; text-decoration: none; border-radius: 4px; display: inline-block;">
            Reset Password
        </a>
    </p>
    <p>Or paste this link into your browser:</p>
    <p style="word-break: break-all; color: #666;">{link}</p>
    <p style="color: #999; font-size: 12px; margin-top: 30px;">
        The link works once and expires soon. If you did not ask for a reset, ignore this email.
    </p>
</body>
</html>"#,
        name = html_escape(name),
        link = html_escape(link),
    )
}

fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
