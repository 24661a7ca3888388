mod reader;
mod schema;

pub use reader::{ClaudeCliReader, sanitize_project_path};
