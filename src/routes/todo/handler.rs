use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::ValidatedJson,
    middleware::AuthUser,
    store::{Todo, TodoPatch},
    utils::{message_to_api_response, success_to_api_response},
};

use super::model::{CreateTodoRequest, UpdateTodoRequest};

// Malformed ids are reported like missing ones.
fn parse_todo_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

#[axum::debug_handler]
pub async fn get_todos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let todos = state.todos.list_todos(user.id).await?;
    Ok((StatusCode::OK, success_to_api_response(todos)))
}

#[axum::debug_handler]
pub async fn add_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateTodoRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let todo = Todo {
        id: Uuid::new_v4(),
        owner_id: user.id,
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        completed: req.completed,
        created_at: now,
        updated_at: now,
    };
    state.todos.insert_todo(&todo).await?;

    tracing::debug!("user {} created todo {}", user.id, todo.id);
    Ok((
        StatusCode::CREATED,
        message_to_api_response("Todo created", Some(todo)),
    ))
}

#[axum::debug_handler]
pub async fn edit_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTodoRequest>,
) -> AppResult<impl IntoResponse> {
    let id = parse_todo_id(&id)?;
    let patch: TodoPatch = req.into();
    let todo = state
        .todos
        .update_todo(user.id, id, &patch, Utc::now())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((
        StatusCode::OK,
        message_to_api_response("Todo updated", Some(todo)),
    ))
}

#[axum::debug_handler]
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_todo_id(&id)?;
    if !state.todos.delete_todo(user.id, id).await? {
        return Err(AppError::NotFound);
    }

    tracing::debug!("user {} deleted todo {}", user.id, id);
    Ok((
        StatusCode::OK,
        message_to_api_response::<()>("Todo deleted", None),
    ))
}
