//! authprobe CLI binary
//!
//! Gates on a service unit and its port, then proves the HTTP endpoint
//! enforces Basic authentication.

use authprobe_core::utils::init_tracing;
use authprobe_core::{AcceptanceCheck, LocalHost};
use clap::{Parser, Subcommand};
use cli::error::EXIT_USAGE;
use cli::{OutputFormat, TargetArgs};
use schema::ScenarioKind;
use tracing::error;

#[derive(Parser)]
#[command(name = "authprobe")]
#[command(about = "Acceptance check for a Basic-auth protected HTTP service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when AUTHPROBE_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for readiness, then run all three credential probes
    Run {
        #[command(flatten)]
        target: TargetArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Wait for the unit and the port only
    Wait {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        json: bool,
    },
    /// Run one probe without waiting for readiness
    Probe {
        #[command(flatten)]
        target: TargetArgs,
        /// anonymous, wrong-password or valid
        #[arg(long)]
        scenario: ScenarioKind,
        #[arg(long)]
        json: bool,
    },
    /// Print the probe table and the command each probe runs
    Scenarios {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn target(&self) -> &TargetArgs {
        match self {
            Commands::Run { target, .. }
            | Commands::Wait { target, .. }
            | Commands::Probe { target, .. }
            | Commands::Scenarios { target, .. } => target,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(EXIT_USAGE);
    }

    let config = match cli.command.target().resolve() {
        Ok(config) => config,
        Err(e) => {
            error!("[{}] {}", e.code(), e);
            std::process::exit(e.exit_code());
        }
    };

    let check = AcceptanceCheck::new(LocalHost::from_config(&config), config);

    let result = match &cli.command {
        Commands::Run { json, .. } => {
            cli::run_check(&check, OutputFormat::from_json_flag(*json)).await
        }
        Commands::Wait { json, .. } => {
            cli::run_wait(&check, OutputFormat::from_json_flag(*json)).await
        }
        Commands::Probe { scenario, json, .. } => {
            cli::run_probe(&check, *scenario, OutputFormat::from_json_flag(*json)).await
        }
        Commands::Scenarios { json, .. } => {
            cli::render_scenarios(&check, OutputFormat::from_json_flag(*json))
        }
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("[{}] {}", e.code(), e);
            std::process::exit(e.exit_code());
        }
    }
}
