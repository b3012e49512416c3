mod fetch;
mod sources;

pub use fetch::FetchReport;
pub use sources::{SourceInfo, SourcesReport};

use crate::cli::{Cli, Command};
use crate::config::FileConfig;
use crate::error::CliError;

/// Result of one command, ready for rendering.
#[derive(Debug)]
pub enum CommandOutput {
    Fetch(FetchReport),
    Sources(SourcesReport),
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let file = FileConfig::load_optional(cli.config.as_deref())?;

    match &cli.command {
        Command::Fetch(args) => fetch::run(args, &file).await.map(CommandOutput::Fetch),
        Command::Sources => Ok(CommandOutput::Sources(sources::run(&file))),
    }
}
