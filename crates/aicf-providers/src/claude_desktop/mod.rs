mod reader;

pub use reader::ClaudeDesktopReader;
