mod analysis;
mod cli;
mod commands;
mod config;
mod data;
mod logging;
mod render;
mod report;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{ensure_dirs, log_issues, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let (mut config, config_issues) = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);
    let log_mode = if cli.log_file {
        LogMode::File
    } else {
        LogMode::Stderr
    };
    let _guard = logging::init(config.log_level, log_mode, log_level_override);
    log_issues(&config_issues);

    match cli.command {
        Some(Commands::Report {
            json,
            compact,
            timeout,
        }) => {
            config.merge_with_args(timeout);
            commands::report::run(config, json, compact)
        }
        Some(Commands::Sources { timeout }) => {
            config.merge_with_args(timeout);
            commands::sources::run(config)
        }
        Some(Commands::Config { path, reset }) => commands::config::run(&config, path, reset),
        None => {
            config.merge_with_args(cli.timeout);
            commands::report::run(config, cli.json, cli.compact)
        }
    }
}
