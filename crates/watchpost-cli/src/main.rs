use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod input;

#[derive(Parser)]
#[command(name = "watchpost")]
#[command(about = "Replay a scripted scene through the watchpost monitor", version)]
struct Cli {
    /// Config file (TOML); defaults to the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the scene until stopped (Esc / q / Ctrl+C)
    Run(RunArgs),
    /// Write a one-off structural dump into the category logs
    Dump(DumpArgs),
    /// Truncate and re-header category logs
    Clear(ClearArgs),
}

#[derive(Args)]
pub struct SceneArgs {
    /// Scene script (JSON)
    #[arg(short, long)]
    pub scene: PathBuf,

    /// Directory for category logs (overrides config)
    #[arg(short, long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Polling interval in milliseconds (overrides config)
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many cycles
    #[arg(short = 'n', long)]
    pub cycles: Option<u64>,

    /// Track snapshots per entity instead of per type
    #[arg(long)]
    pub per_entity: bool,
}

#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Entity display name; dumps every rooted tree when omitted
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Target category log
    #[arg(long, default_value = "structure")]
    pub category: String,

    /// Header line written above the dump
    #[arg(long, default_value = "Manual dump")]
    pub header: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Single category to clear; clears every log when omitted
    #[arg(long)]
    pub category: Option<String>,

    /// Directory for category logs (overrides config)
    #[arg(short, long)]
    pub log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("watchpost=info".parse()?)
                .add_directive("watchpost_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => commands::run::run(config, &args),
        Command::Dump(args) => commands::dump::run(config, &args),
        Command::Clear(args) => commands::clear::run(config, &args),
    }
}
