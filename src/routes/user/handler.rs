use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppResult,
    extract::ValidatedJson,
    utils::{error_codes, message_to_api_response},
};

use super::model::{
    ForgetRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest, UserSummary,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .credentials
        .create_user(&req.email, &req.name, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        message_to_api_response("User registered successfully", Some(UserSummary::from(user))),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state.credentials.login(&req.email, &req.password).await?;
    let issued = state.tokens.issue(user.id)?;

    tracing::info!("user {} logged in", user.id);
    Ok((
        StatusCode::OK,
        axum::Json(LoginResponse {
            code: error_codes::SUCCESS,
            message: "Login successful".into(),
            token: issued.token,
            expires_at: issued.expires_at,
            user: UserSummary::from(user),
        }),
    ))
}

#[axum::debug_handler]
pub async fn forget(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgetRequest>,
) -> AppResult<impl IntoResponse> {
    state.resets.request_reset(&req.email).await?;

    Ok((
        StatusCode::OK,
        message_to_api_response::<()>(
            "If that email is registered, a password reset link has been sent",
            None,
        ),
    ))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Path((reset_id, reset_token)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .resets
        .reset_password(&reset_id, &reset_token, &req.password)
        .await?;

    Ok((
        StatusCode::OK,
        message_to_api_response::<()>("Password reset successful", None),
    ))
}
