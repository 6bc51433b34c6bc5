//! Жизненный цикл сервиса: журнал, строки старта/остановки, watcher.
//!
//! Тонкий слой поверх модулей: вся логика в `file_watcher` и `mover`.

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::activity_log::{ActivityLog, SERVICE_STARTED, SERVICE_STOPPED};
use crate::config::OrganizerConfig;
use crate::error::Result;
use crate::file_watcher::{self, WatcherHandle, WatcherState};
use crate::mover::{MoveOutcome, Mover};

/// Запущенный сервис.
pub struct RunningService {
  watcher: WatcherHandle,
  log: Arc<ActivityLog>,
}

impl RunningService {
  pub fn watch_dir(&self) -> &Path {
    self.watcher.watch_dir()
  }

  pub fn log_path(&self) -> &Path {
    self.log.path()
  }

  pub fn state(&self) -> WatcherState {
    self.watcher.state()
  }

  /// Подать сигнал остановки; см. [`WatcherHandle::request_stop`].
  pub fn request_stop(&self) {
    self.watcher.request_stop();
  }

  /// Остановить мониторинг (graceful shutdown).
  ///
  /// Сначала дожидаемся watcher'а, чтобы строка остановки была последней.
  pub fn shutdown(self) -> Result<()> {
    self.watcher.stop()?;
    self.log.record(SERVICE_STOPPED);
    info!("Service stopped");
    Ok(())
  }
}

/// Запустить сервис.
pub fn start(config: &OrganizerConfig) -> Result<RunningService> {
  start_with_observer(config, |_, _| {})
}

/// Запустить сервис с callback'ом на каждый обработанный файл.
pub fn start_with_observer(
  config: &OrganizerConfig,
  on_processed: impl Fn(&Path, &MoveOutcome) + Send + 'static,
) -> Result<RunningService> {
  // Журнал создаётся до подписки, чтобы его появление не стало событием.
  let log = Arc::new(ActivityLog::open(config.log_file_path())?);
  let mover = Mover::new(config, Arc::clone(&log));

  let watcher = file_watcher::start_watcher(mover, config.debounce(), on_processed)?;
  log.record(SERVICE_STARTED);
  info!(
    "Service started: monitoring {} (debounce {:?})",
    watcher.watch_dir().display(),
    config.debounce()
  );

  Ok(RunningService { watcher, log })
}
