//! `aoistudio search`: resolve a place name.

use clap::Args;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text place query
    pub query: String,
}

pub async fn run(runner: &CliRunner, args: SearchArgs) -> Result<(), CliError> {
    runner.log_startup("search");
    let workspace = runner.workspace(None)?;

    let Some(result) = workspace.search(&args.query).await else {
        return Err(CliError::InvalidArgument(
            "Search query must not be empty".to_string(),
        ));
    };
    let found = result.map_err(CliError::Search)?;

    println!("{}", found.label);
    println!("  {}", found.location);
    Ok(())
}
