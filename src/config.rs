//! Конфигурация сервиса.
//!
//! Собирается один раз при старте и после этого не меняется. Файлов
//! конфигурации и флагов командной строки нет: таблица категорий встроена.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classifier::{default_categories, CategoryTable};
use crate::error::{OrganizerError, Result};

/// Имя папки загрузок, если ОС не сообщает её сама.
pub const DOWNLOADS_FOLDER_NAME: &str = "Downloads";

/// Имя журнала внутри корня наблюдения.
pub const DEFAULT_LOG_FILE_NAME: &str = "organizer_history.log";

/// Пауза перед обработкой нового файла, чтобы запись успела завершиться.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct OrganizerConfig {
  watch_root: PathBuf,
  log_file_name: String,
  debounce: Duration,
  categories: CategoryTable,
}

impl OrganizerConfig {
  /// Конфигурация для явно указанной директории.
  ///
  /// Путь должен быть абсолютным, существовать и быть директорией.
  pub fn new(watch_root: impl Into<PathBuf>) -> Result<Self> {
    let watch_root = watch_root.into();
    if watch_root.as_os_str().is_empty() {
      return Err(OrganizerError::InvalidPath("empty watch root".to_string()));
    }
    if !watch_root.is_absolute() {
      return Err(OrganizerError::InvalidPath(format!(
        "watch root must be absolute: {}",
        watch_root.display()
      )));
    }
    validate_watch_root(&watch_root)?;

    Ok(Self {
      watch_root,
      log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
      debounce: DEFAULT_DEBOUNCE,
      categories: default_categories()?,
    })
  }

  /// Конфигурация для папки загрузок текущего пользователя.
  pub fn from_default_location() -> Result<Self> {
    Self::new(default_watch_root()?)
  }

  pub fn with_debounce(mut self, debounce: Duration) -> Self {
    self.debounce = debounce;
    self
  }

  pub fn with_log_file_name(mut self, name: impl Into<String>) -> Self {
    self.log_file_name = name.into();
    self
  }

  pub fn with_categories(mut self, categories: CategoryTable) -> Self {
    self.categories = categories;
    self
  }

  pub fn watch_root(&self) -> &Path {
    &self.watch_root
  }

  pub fn log_file_name(&self) -> &str {
    &self.log_file_name
  }

  pub fn log_file_path(&self) -> PathBuf {
    self.watch_root.join(&self.log_file_name)
  }

  pub fn debounce(&self) -> Duration {
    self.debounce
  }

  pub fn categories(&self) -> &CategoryTable {
    &self.categories
  }
}

/// Папка загрузок: сначала то, что сообщает ОС, затем `~/Downloads`.
pub fn default_watch_root() -> Result<PathBuf> {
  dirs::download_dir()
    .or_else(|| dirs::home_dir().map(|home| home.join(DOWNLOADS_FOLDER_NAME)))
    .ok_or(OrganizerError::DownloadsDirNotFound)
}

fn validate_watch_root(path: &Path) -> Result<()> {
  match std::fs::metadata(path) {
    Ok(m) if m.is_dir() => Ok(()),
    Ok(_) => Err(OrganizerError::WatchRootNotADirectory(path.to_path_buf())),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      Err(OrganizerError::WatchRootNotFound(path.to_path_buf()))
    }
    Err(e) => Err(OrganizerError::Io(e)),
  }
}
