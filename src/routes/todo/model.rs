use serde::Deserialize;
use validator::Validate;

use crate::store::{TodoPatch, TodoStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(
        custom(function = "crate::extract::not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub title: String,
    #[validate(
        custom(function = "crate::extract::not_blank"),
        length(max = 2000, message = "must be at most 2000 characters")
    )]
    pub description: String,
    #[serde(default, alias = "status")]
    pub completed: TodoStatus,
}

/// Partial edit; absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(
        custom(function = "crate::extract::not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub title: Option<String>,
    #[validate(
        custom(function = "crate::extract::not_blank"),
        length(max = 2000, message = "must be at most 2000 characters")
    )]
    pub description: Option<String>,
    #[serde(default, alias = "status")]
    pub completed: Option<TodoStatus>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(req: UpdateTodoRequest) -> Self {
        Self {
            title: req.title.map(|t| t.trim().to_string()),
            description: req.description.map(|d| d.trim().to_string()),
            completed: req.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_and_alias() {
        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"T","description":"D"}"#).unwrap();
        assert_eq!(req.completed, TodoStatus::ToDo);

        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"T","description":"D","status":"In Progress"}"#)
                .unwrap();
        assert_eq!(req.completed, TodoStatus::InProgress);
    }

    #[test]
    fn blank_title_fails_validation() {
        let req: CreateTodoRequest =
            serde_json::from_str(r#"{"title":"  ","description":"D"}"#).unwrap();
        assert!(req.validate().is_err());

        let patch: UpdateTodoRequest = serde_json::from_str(r#"{"description":""}"#).unwrap();
        assert!(patch.validate().is_err());

        let patch: UpdateTodoRequest = serde_json::from_str(r#"{"completed":"Completed"}"#).unwrap();
        assert!(patch.validate().is_ok());
    }
}
