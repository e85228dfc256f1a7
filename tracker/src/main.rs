//! `food-tracker` entry-point: loads configuration, wires the Google adapters
//! and runs the requested command.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use food_tracker::config::TrackerConfig;
use food_tracker::inbound::cli::{App, CliArgs, Command, TerminalPresenter, load_photo, run_session};
use mockable::{Clock, DefaultClock};
use tokio::io::BufReader;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args))
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

async fn run(args: CliArgs) -> Result<ExitCode> {
    let config = TrackerConfig::load().wrap_err("invalid Google configuration")?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let presenter = Arc::new(TerminalPresenter::new(io::stdout()));
    let mut app = App::from_config(&config, clock.clone(), presenter)
        .wrap_err("failed to build HTTP clients")?;

    match args.command {
        Command::Log(log) => {
            let photo = load_photo(&log.photo)?;
            let outcome = app.save(&log.draft(clock.local()), &photo).await;
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Session => {
            run_session(&mut app, BufReader::new(tokio::io::stdin()), clock.as_ref())
                .await
                .wrap_err("failed to read from stdin")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
