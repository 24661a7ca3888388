use aicf_types::Source;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "aicf", version, about = "Age-tiered conversation memory store")]
pub struct Cli {
    /// Project root (defaults to the working directory)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the store skeleton and record per-source consent
    Init(InitArgs),

    /// Preserve pre-existing memory files and lay down the tiered skeleton
    Migrate,

    /// Run the pipeline on the polling interval
    Watch(WatchArgs),

    /// Run exactly one pipeline cycle and print the report
    Cycle(CycleArgs),

    /// Inspect or change per-source consent
    Permissions(PermissionsArgs),

    /// Stage a foreign export file into the cache (no consolidation)
    Import(ImportArgs),

    /// Show store state, per-tier counts and source consent
    Status,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Enable every source detectable on this machine
    #[arg(long, conflicts_with = "manual")]
    pub automatic: bool,

    /// Enable only the sources named with --source
    #[arg(long)]
    pub manual: bool,

    /// Sources to enable with --manual
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceArg>,

    /// Re-run initialization even if the store exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Restrict the pipeline to these sources
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceArg>,

    /// Override the configured polling interval (milliseconds)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Keep running in the foreground (the default is also a loop; this
    /// flag exists for service managers that expect it)
    #[arg(long)]
    pub daemon: bool,

    /// Run one cycle and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Args)]
pub struct CycleArgs {
    /// Restrict the cycle to these sources
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceArg>,

    /// Fix "today" for age arithmetic (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct PermissionsArgs {
    #[command(subcommand)]
    pub action: PermissionsAction,
}

#[derive(Debug, Subcommand)]
pub enum PermissionsAction {
    /// Show consent state and availability per source
    List,
    /// Record consent for a source
    Grant { source: SourceArg },
    /// Withdraw consent for a source
    Revoke { source: SourceArg },
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Source the export came from
    #[arg(long, value_enum)]
    pub source: SourceArg,

    /// Export file (JSON array or JSONL)
    pub file: PathBuf,
}

/// clap-facing mirror of [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Augment,
    ClaudeCli,
    ClaudeDesktop,
    Warp,
}

impl From<SourceArg> for Source {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Augment => Source::Augment,
            SourceArg::ClaudeCli => Source::ClaudeCli,
            SourceArg::ClaudeDesktop => Source::ClaudeDesktop,
            SourceArg::Warp => Source::Warp,
        }
    }
}
