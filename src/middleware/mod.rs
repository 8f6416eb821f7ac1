mod auth;
mod error_handler;

pub use auth::{AuthUser, auth_middleware, authenticate};
pub use error_handler::log_errors;
