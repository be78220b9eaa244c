mod commands;
mod config;
mod observability;

use clap::{Parser, Subcommand};
use commands::CliError;
use config::Config;
use ortb_converter::OrtbConverter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(about = "Convert auction bid requests to OpenRTB and OpenRTB bids back")]
struct Cli {
    /// YAML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print the OpenRTB request for a set of bid requests
    Request {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the bid responses converted from an OpenRTB response
    Response {
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum MainError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Observability(#[from] observability::ObservabilityError),
    #[error(transparent)]
    Converter(#[from] ortb_converter::ConverterError),
    #[error(transparent)]
    Command(#[from] CliError),
    #[error("could not serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "ortbc failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MainError> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let _guard = observability::init(&config.common)?;
    let converter = OrtbConverter::new(config.converter)?;

    let output = match &cli.command {
        CliCommand::Request { input } => {
            serde_json::to_string_pretty(&commands::build_request(&converter, input)?)?
        }
        CliCommand::Response { input } => {
            serde_json::to_string_pretty(&commands::interpret_response(&converter, input)?)?
        }
    };
    println!("{output}");

    Ok(())
}
