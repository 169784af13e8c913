use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rolecall::commands::{
    doctor::DoctorArgs, init::InitArgs, roles::RolesArgs, run::RunArgs, schema::SchemaArgs,
};
use rolecall::{error, telemetry};

#[derive(Debug, Parser)]
#[command(
    name = "rolecall",
    version,
    about = "Group-chat assistant for claiming project roles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Connect to Telegram and serve role selection
    Run(RunArgs),
    /// Print the effective role catalog
    Roles(RolesArgs),
    /// Validate config, catalog, token and admin list
    Doctor(DoctorArgs),
    /// Write a starter .rolecall.toml
    Init(InitArgs),
    /// Print the JSON Schema for .rolecall.toml
    Schema(SchemaArgs),
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Roles(_) => "roles",
            Self::Doctor(_) => "doctor",
            Self::Init(_) => "init",
            Self::Schema(_) => "schema",
        }
    }
}

fn main() -> ExitCode {
    // A missing .env is fine; the environment may already carry everything.
    let _ = dotenv::dotenv();
    telemetry::init();

    let cli = Cli::parse();

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Roles(args) => args.execute(),
        Commands::Doctor(args) => args.execute(),
        Commands::Init(args) => args.execute(),
        Commands::Schema(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<error::ExitError>() {
                eprintln!("error: {exit_err}");
                exit_err.exit_code()
            } else {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}
