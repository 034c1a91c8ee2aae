//! lessonmap CLI: browse a Strapi-backed course catalog from the terminal.
//!
//! Fetches the class → chapter → lesson tree, resolves single pages, and
//! keeps the navigation sidebar's expand/collapse state between runs.

mod commands;
mod render;

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
