mod cli;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logging::LogLevel;
use rhizaman_core::{
    config::{self, Config},
    exec::{CommandRunner, ShellCommandRunner},
    git::Repository,
    state::AppState,
};
use rhizaman_tui::Theme;
use std::{path::PathBuf, process::ExitCode, sync::Arc};

#[derive(Parser)]
#[command(version, about = "Status and sync dashboard for rhiza-templated git repositories")]
struct Cli {
    /// Override path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Config file, same as --config
    #[arg(value_name = "CONFIG", conflicts_with = "config")]
    config_path: Option<PathBuf>,

    /// Level written to the log file
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured and discovered repositories
    List {
        #[arg(long)]
        json: bool,
    },
    /// Probe every repository once and print its status
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_errors = matches!(
        cli.command,
        Some(Commands::List { json: true } | Commands::Status { json: true })
    );

    if let Err(error) = logging::init(cli.log_level) {
        eprintln!("Warning: file logging disabled: {error:#}");
    }

    let config_path = cli.config.or(cli.config_path);
    let (config, repos) = match load(config_path.as_deref()) {
        Ok(loaded) => loaded,
        Err(error) => {
            log::error!("startup failed: {error:#}");
            let cli_error = cli::CliError::system(format!("{error:#}"));
            cli::print_error(&cli_error, json_errors);
            return ExitCode::from(2);
        }
    };

    let runner: Arc<dyn CommandRunner> = Arc::new(ShellCommandRunner);
    let result = match cli.command {
        Some(Commands::List { json }) => cli::cmd_list(&repos, json),
        Some(Commands::Status { json }) => cli::cmd_status(&repos, runner.as_ref(), json),
        None => run_tui(&config, repos, &runner).map_err(cli::CliError::from),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(error) => {
            cli::print_error(&error, json_errors);
            let code: u8 = match error.code() {
                1 => 1,
                _ => 2,
            };
            ExitCode::from(code)
        }
    }
}

fn load(config_path: Option<&std::path::Path>) -> Result<(Config, Vec<Repository>)> {
    let config = config::load_config(config_path)?;
    let cwd = std::env::current_dir()?;
    let repos = config.resolved_repositories(&cwd)?;
    log::info!("loaded {} repositories", repos.len());
    Ok((config, repos))
}

fn run_tui(config: &Config, repos: Vec<Repository>, runner: &Arc<dyn CommandRunner>) -> Result<()> {
    let theme = Theme::from_config(&config.theme);
    let mut state = AppState::new(repos, config.sync.message_timeout());

    let mut terminal = ratatui::init();
    let result = rhizaman_tui::run(&mut terminal, &mut state, runner, &theme, &config.sync);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_defaults_to_warn() {
        let cli = Cli::try_parse_from(["rhizaman", "list"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_log_level_parses_known_value() {
        let cli = Cli::try_parse_from(["rhizaman", "--log-level", "debug", "status"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let error = Cli::try_parse_from(["rhizaman", "--log-level", "loud"])
            .err()
            .unwrap();
        assert_eq!(error.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
