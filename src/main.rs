mod app;
mod event;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use tfdash::config::Config;
use tfdash::{Dispatcher, HttpResourceClient, Store};

/// Environment variable holding the default log filter
const LOG_ENV: &str = "TFDASH_LOG";

#[derive(Parser, Debug)]
#[command(name = "tfdash")]
#[command(about = "A terminal dashboard for tfwatch projects")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/tfdash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Root of the tfwatch API, overriding config and TFDASH_API_URL
  #[arg(short, long)]
  base_url: Option<String>,

  /// Log filter, e.g. "debug" or "tfdash=trace" (default: $TFDASH_LOG or info)
  #[arg(long)]
  log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, command line wins over file and environment
  let config = Config::load(args.config.as_deref())?.with_api_url(args.base_url);

  // The terminal belongs to the UI, so logs go to a file
  let filter_spec = args
    .log_level
    .or_else(|| std::env::var(LOG_ENV).ok())
    .unwrap_or_else(|| "info".to_string());
  let filter = EnvFilter::try_new(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"));

  let log_dir = Config::log_dir()?;
  std::fs::create_dir_all(&log_dir)?;
  let appender = tracing_appender::rolling::daily(&log_dir, "tfdash.log");
  let (writer, _guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false),
    )
    .init();

  let client = HttpResourceClient::new(&config.api)?;
  tracing::info!(base_url = %client.base_url(), "starting");

  // Initialize and run the app
  let events = event::EventHandler::new(Duration::from_millis(250));
  let store = Store::new();
  let dispatcher =
    Dispatcher::new(Arc::new(client), store.clone()).with_events(events.action_sender());

  let mut app = app::App::new(config, store, dispatcher);
  app.run(events).await?;

  Ok(())
}
