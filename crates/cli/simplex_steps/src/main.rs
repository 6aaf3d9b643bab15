//! Simplex step replayer CLI.

use std::io::{self, IsTerminal};

use clap::Parser;

mod cli;
mod commands;
mod logging;
mod render;

use crate::cli::Cli;
use crate::logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli));

    let exit_code = match commands::run(&cli) {
        Ok(false) => 0,
        Ok(true) => 1,
        Err(error) => {
            eprintln!("error: {:#}", error);
            1
        }
    };
    std::process::exit(exit_code);
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        with_ansi: io::stderr().is_terminal(),
    }
}
