// reminders/src/main.rs

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use reminders::{run, ReminderError, ReminderOptions};
use storage::MemoryStore;

/// Sends appointment reminders to patients for appointments scheduled for
/// the next day.
#[derive(Debug, Parser)]
#[command(name = "reminders", version)]
struct Cli {
    /// Simulates sending reminders without logging them.
    #[arg(long)]
    dry_run: bool,

    /// Date (YYYY-MM-DD) to send reminders for, instead of tomorrow.
    #[arg(long)]
    date: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let opts = ReminderOptions { dry_run: cli.dry_run, date: cli.date };

    let store = MemoryStore::new();
    let mut stdout = io::stdout();

    match run(&store, &opts, &mut stdout).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err @ ReminderError::InvalidDate(_)) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Reminder run failed: {err}");
            ExitCode::FAILURE
        }
    }
}
