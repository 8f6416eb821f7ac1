use axum::Json;
use bcrypt::{BcryptError, hash, verify};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Bytes of entropy in a reset secret before hex encoding.
const SECRET_BYTES: usize = 32;

/// bcrypt reads at most this many bytes of a password.
pub const BCRYPT_MAX_BYTES: usize = 72;

pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password.as_bytes(), cost)
}

/// A candidate longer than bcrypt's window never matches, even when its first
/// 72 bytes equal a stored password.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    if password.len() > BCRYPT_MAX_BYTES {
        return Ok(false);
    }
    verify(password.as_bytes(), hashed)
}

/// Random hex secret handed out in reset links.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Only this digest of a reset secret is ever persisted.
pub fn digest_secret(secret: &str) -> String {
    let mut h = Sha256::new();
    h.update(secret.as_bytes());
    hex::encode(h.finalize())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    message_to_api_response("success", Some(data))
}

pub fn message_to_api_response<T: Serialize>(
    message: &str,
    data: Option<T>,
) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        message: message.into(),
        data,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const UNAUTHORIZED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const INVALID_RESET_TOKEN: i32 = 1006;
    pub const INTERNAL_ERROR: i32 = 5000;
}
