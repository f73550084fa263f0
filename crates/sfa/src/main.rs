mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // The file config also carries logging defaults
    let file_config = config::load(&cli.global);
    let (level, config_log_file) = match &file_config {
        Ok(cfg) => (cfg.log.level.clone(), cfg.log.file.clone()),
        Err(_) => ("warn".to_owned(), None),
    };
    let log_file = cli.global.log_file.clone().or(config_log_file);
    let guard = init_tracing(cli.global.verbose, &level, log_file.as_deref());

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, file_config).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        drop(guard);
        std::process::exit(code);
    }
}

fn init_tracing(
    verbosity: u8,
    default_level: &str,
    log_file: Option<&Path>,
) -> Option<WorkerGuard> {
    let filter = match verbosity {
        0 => default_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let Some((dir, name)) = log_file.and_then(|path| {
        let name = path.file_name()?;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Some((dir, name))
    }) else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .init();
    Some(guard)
}

async fn run(
    cli: Cli,
    file_config: Result<sfa_config::Config, CliError>,
) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an engine
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "sfa", &mut std::io::stdout());
            Ok(())
        }

        // Everything else subscribes to the engine
        cmd => {
            let mut cfg = file_config?;
            config::apply_overrides(&cli.global, &mut cfg);
            let endpoint = config::endpoint(&cfg)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, endpoint, &cli.global).await
        }
    }
}
