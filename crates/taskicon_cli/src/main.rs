//! Command-line host for the Taskicon task store.
//!
//! # Responsibility
//! - Drive store operations from a terminal for scripting and diagnostics.
//! - Run the daily reset scheduler in `watch` mode.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::run(cli).await
}
