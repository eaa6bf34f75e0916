pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "concierge",
    about = "Summit concierge operator CLI",
    long_about = "Operate the concierge record store, inspect configuration, and talk to the \
                  conversation runtime from a terminal.",
    after_help = "Examples:\n  concierge migrate\n  concierge seed\n  concierge doctor --json\n  \
                  concierge chat \"Who are the speakers?\" --registration-id R-1001"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic airline and summit demo records")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM provider readiness, and record store connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Send one message through the conversation runtime and print the envelope")]
    Chat {
        #[arg(help = "Message text; an empty message returns the greeting")]
        message: String,
        #[arg(long, help = "Summit registration id used to look up the attendee")]
        registration_id: Option<String>,
        #[arg(long, help = "Airline account number used to look up bookings")]
        account_number: Option<String>,
        #[arg(long, help = "Booking confirmation number to work with")]
        confirmation_number: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Chat { message, registration_id, account_number, confirmation_number } => {
            commands::chat::run(
                &message,
                commands::chat::ChatHints { registration_id, account_number, confirmation_number },
            )
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
