#![warn(unused_extern_crates)]

mod cache;
mod cmd;
mod config;
mod credential_providers;
mod resolver;
mod types;
mod utils;

use chrono::Utc;
use cmd::Cli;
use config::Config;
use credential_providers::oci_cmd::OciCmdCredentialProvider;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::Error),
    #[error(transparent)]
    Resolve(#[from] resolver::Error),
    #[error("failed to write the credentials to stdout: {0}")]
    Stdout(#[source] io::Error),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = Config::from_cli(cli)?;
    let provider = OciCmdCredentialProvider::new(config.oci_path.clone());
    let exec_creds = resolver::resolve_credential(&config, &provider, Utc::now)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&exec_creds).map_err(Error::Stdout)?;
    stdout.flush().map_err(Error::Stdout)
}

fn main() -> ExitCode {
    let cli = Cli::from_env_args();
    init_tracing(cli.verbose);
    if !cli.ignored.is_empty() {
        debug!(ignored = ?cli.ignored, "ignoring arguments after the flags");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
