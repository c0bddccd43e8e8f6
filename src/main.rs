mod app;
mod commands;
mod config;
mod crm;
mod event;
mod grid;
mod master_data;
mod query;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use config::Config;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crmview")]
#[command(about = "A terminal front end for a CRM backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/crmview/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Entity list to open first (leads, clients, opportunities, sows, partners, employees)
  #[arg(short, long)]
  view: Option<String>,
}

/// Log to a daily rolling file; the terminal belongs to the UI.
/// Level comes from RUST_LOG, else the config's log_level, else "info".
fn init_tracing(config: &Config) -> WorkerGuard {
  let file_appender = tracing_appender::rolling::daily(Config::log_dir(), "crmview.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    EnvFilter::try_new(config.log_level.as_deref().unwrap_or("info"))
      .unwrap_or_else(|_| EnvFilter::new("info"))
  });

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(filter)
    .init();

  guard
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = Config::load(args.config.as_deref())?;

  // Override the start view if specified on command line
  if let Some(view) = args.view {
    config.default_view = view;
    if config.entity().is_none() {
      return Err(eyre!("Unknown view '{}'", config.default_view));
    }
  }

  let _guard = init_tracing(&config);
  info!(backend = %config.backend.url, view = %config.default_view, "Starting crmview");

  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
