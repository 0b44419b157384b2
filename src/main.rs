mod app;
mod cache;
mod config;
mod event;
mod notify;
mod query;
mod salary;
mod store;
mod ui;
mod validate;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rosterm")]
#[command(about = "A terminal UI for a hosted team roster, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/rosterm/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Store project id, overriding the config file
  #[arg(short, long)]
  project: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Log to a file; stdout belongs to the TUI
  let _log_guard = init_logging();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override the store project if specified on the command line
  if let Some(project) = args.project {
    config.store.project_id = project;
  }

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()?.join("rosterm");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "rosterm.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}
