mod cli;
mod commands;
mod config;
mod prompter;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::CliConfig;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("binpatch=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load_or_default(&cli.config);
    let pause = cli.pause || config.pause;

    let result = run(cli.command, &config);
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    if pause {
        prompter::wait_for_enter("\nPress Enter to exit...");
    }

    result
}

fn run(command: Command, config: &CliConfig) -> Result<()> {
    match command {
        Command::Apply {
            target,
            patches,
            output,
            dry_run,
        } => {
            let target = config.target(target)?;
            let patches = config.patches(patches);
            let output = config.output(output);
            commands::apply::run(&target, patches.as_deref(), output.as_deref(), dry_run)
        }
        Command::Scan { target, find } => {
            let target = config.target(target)?;
            commands::scan::run(&target, &find)
        }
        Command::Write {
            target,
            offset,
            bytes,
        } => {
            let target = config.target(target)?;
            commands::write::run(&target, &offset, &bytes)
        }
        Command::ExportBuiltin { output } => commands::export::run(output.as_deref()),
    }
}
