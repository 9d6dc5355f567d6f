use clap::{Parser, Subcommand};
use queuewatch::config::HumanDuration;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "queuewatch")]
#[command(about = "Periodic job-queue statistics collector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the collection loop until interrupted
    Run(RunArgs),
    /// Collect a single snapshot and print it as JSON
    Collect(CollectArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "QUEUEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Break counts down per queue name
    #[arg(long)]
    pub by_queue: bool,

    /// Override the collection interval (e.g. "15s", "1m")
    #[arg(long)]
    pub interval: Option<HumanDuration>,
}

#[derive(clap::Args, Debug)]
pub struct CollectArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "QUEUEWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Break counts down per queue name
    #[arg(long)]
    pub by_queue: bool,
}
