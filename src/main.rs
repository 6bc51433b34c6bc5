use std::process::ExitCode;

use log::{error, info};
use tokio::signal;

use downloads_organizer::logging::init_logging;
use downloads_organizer::{service, OrganizerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  init_logging();

  let config = match OrganizerConfig::from_default_location() {
    Ok(c) => c,
    Err(e) => {
      eprintln!("ERROR: {e}");
      return ExitCode::FAILURE;
    }
  };

  let running = match service::start(&config) {
    Ok(r) => r,
    Err(e) => {
      eprintln!("ERROR: failed to start: {e}");
      return ExitCode::FAILURE;
    }
  };

  println!(
    "Monitoring {} (log: {}). Press Ctrl+C to stop.",
    running.watch_dir().display(),
    running.log_path().display()
  );

  wait_for_shutdown_signal().await;

  if let Err(e) = running.shutdown() {
    error!("Shutdown failed: {e}");
    return ExitCode::FAILURE;
  }
  ExitCode::SUCCESS
}

async fn wait_for_shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      error!("Failed to install Ctrl+C handler: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut s) => {
        s.recv().await;
      }
      Err(e) => {
        error!("Failed to install SIGTERM handler: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => info!("Received Ctrl+C, shutting down..."),
    () = terminate => info!("Received SIGTERM, shutting down..."),
  }
}
