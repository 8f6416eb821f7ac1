mod handler;
mod model;

pub use handler::{forget, login, register, reset_password};
