use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;
use crate::utils::BCRYPT_MAX_BYTES;

/// JSON body that must deserialize and pass its `validator` rules.
/// Either failure becomes [`AppError::Validation`].
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| AppError::Validation(describe(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: invalid value", field),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Length rule for new passwords; the upper bound is bcrypt's byte window.
pub fn bcrypt_password(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().count() < MIN_PASSWORD_CHARS {
        let mut err = validator::ValidationError::new("too_short");
        err.message = Some(format!("must be at least {} characters", MIN_PASSWORD_CHARS).into());
        return Err(err);
    }
    if value.len() > BCRYPT_MAX_BYTES {
        let mut err = validator::ValidationError::new("too_long");
        err.message = Some(format!("must be at most {} bytes", BCRYPT_MAX_BYTES).into());
        return Err(err);
    }
    Ok(())
}
