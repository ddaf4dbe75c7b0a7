mod cli;
mod config;
mod render;
mod run;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use watch_logging::{watch_error, LogDestination};

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    watch_logging::initialize(LogDestination::Terminal, level);

    match dispatch(&cli) {
        Ok(code) => code,
        Err(err) => {
            watch_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> anyhow::Result<ExitCode> {
    let file = config::load(cli)?;
    let style = render::resolve_style(cli.pretty, cli.plain);

    match &cli.command {
        Command::List { all, filters } => {
            let resolved = config::resolve(cli, file, false)?;
            run::run_list(&resolved, filters, *all, style)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Daemon { filters } => {
            let resolved = config::resolve(cli, file, true)?;
            let code = run::run_daemon(&resolved, filters)?;
            Ok(if code == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(code as u8)
            })
        }
    }
}
