mod api;
mod app;
mod config;
mod error;
mod event;
mod sync;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::api::types::NoteTag;

#[derive(Parser, Debug)]
#[command(name = "notehub")]
#[command(about = "A terminal client for the NoteHub note collection")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/notehub/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Start with the listing filtered to this tag
  #[arg(short, long)]
  tag: Option<NoteTag>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_logging()?;

  let config = config::Config::load(args.config.as_deref())?;

  let mut app = app::App::new(&config, args.tag)?;
  app.run().await?;

  Ok(())
}

/// Log to a file in the user data directory; stdout belongs to the TUI.
/// Filter via NOTEHUB_LOG (env-filter syntax), default "info".
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let dir = dirs::data_dir()
    .map(|d| d.join("notehub"))
    .unwrap_or_else(|| PathBuf::from("."));
  std::fs::create_dir_all(&dir)?;

  let file = tracing_appender::rolling::never(&dir, "notehub.log");
  let (writer, guard) = tracing_appender::non_blocking(file);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_env("NOTEHUB_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
