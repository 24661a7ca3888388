pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Command};

use anyhow::Result;

/// Dispatch a parsed invocation; the returned code becomes the process exit
/// status.
pub fn run(cli: Cli) -> Result<i32> {
    let project_root = match &cli.project {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    match cli.command {
        Command::Init(args) => commands::init(&project_root, args),
        Command::Migrate => commands::migrate(&project_root),
        Command::Watch(args) => commands::watch(&project_root, args),
        Command::Cycle(args) => commands::cycle(&project_root, args),
        Command::Permissions(args) => commands::permissions(&project_root, args),
        Command::Import(args) => commands::import(&project_root, args),
        Command::Status => commands::status(&project_root),
    }
}
