mod handler;
mod model;

pub use handler::{add_todo, delete_todo, edit_todo, get_todos};
