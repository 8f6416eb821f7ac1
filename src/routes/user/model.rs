use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::store::User;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        custom(function = "crate::extract::not_blank"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(custom(function = "crate::extract::bcrypt_password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgetRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "crate::extract::bcrypt_password"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub code: i32,
    pub message: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
}
