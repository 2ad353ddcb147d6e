mod commands;
mod helpers;

use clap::Parser;
use krige_core::domain::KrigeError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let krige_error = error.as_krige_error();
            eprintln!("{}", krige_error.diagnostic_line());
            eprintln!("{}", krige_error.fatal_exit_line());
            krige_error.exit_code()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "krige", version, about = "Ordinary kriging weights and detrended interpolation")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Solve kriging weights for every grid cell of a distance problem
    Weights(commands::WeightsArgs),
    /// Interpolate station values onto grid cells with detrended kriging
    Interpolate(commands::InterpolateArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Weights(args) => commands::run_weights_command(args),
        CliCommand::Interpolate(args) => commands::run_interpolate_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(KrigeError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_krige_error(&self) -> KrigeError {
        match self {
            Self::Usage(message) => {
                KrigeError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => KrigeError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<KrigeError> for CliError {
    fn from(error: KrigeError) -> Self {
        Self::Compute(error)
    }
}
