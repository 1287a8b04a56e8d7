//! postdate CLI: how old is this job posting?
//!
//! Fetches a posting (or reads a saved one), resolves its posting date from
//! meta tags, structured data, PDF metadata and visible text, and prints an
//! urgency tier with application advice.

mod commands;
mod output;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
