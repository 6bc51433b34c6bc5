//! Перемещение файла в директорию его категории.
//!
//! Один вызов [`Mover::move_file`] — одна попытка, без повторов. Любая
//! ошибка ФС возвращается как [`MoveOutcome::Failed`] и пишется в журнал;
//! наружу она не пробрасывается, watcher продолжает работу.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::activity_log::ActivityLog;
use crate::classifier::CategoryTable;
use crate::config::OrganizerConfig;
use crate::error::{OrganizerError, Result};
use crate::namer;

/// Почему файл оставлен на месте.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Это сам журнал.
  LogFile,
  NoMatchingCategory,
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::LogFile => f.write_str("activity log file"),
      Self::NoMatchingCategory => f.write_str("no matching category"),
    }
  }
}

/// Результат одной попытки.
#[derive(Debug)]
pub enum MoveOutcome {
  Moved { category: String, final_path: PathBuf },
  Skipped(SkipReason),
  Failed(OrganizerError),
}

pub struct Mover {
  root: PathBuf,
  log_file_name: String,
  categories: CategoryTable,
  log: Arc<ActivityLog>,
}

impl Mover {
  pub fn new(config: &OrganizerConfig, log: Arc<ActivityLog>) -> Self {
    Self {
      root: config.watch_root().to_path_buf(),
      log_file_name: config.log_file_name().to_string(),
      categories: config.categories().clone(),
      log,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn activity_log(&self) -> &ActivityLog {
    &self.log
  }

  /// Указывает ли путь на журнал (сравнение по имени файла).
  pub fn is_log_file(&self, path: &Path) -> bool {
    path
      .file_name()
      .is_some_and(|name| name == self.log_file_name.as_str())
  }

  /// Переместить файл и записать результат в журнал.
  ///
  /// `Moved` даёт строку `SUCCESS`, `Failed` — строку `ERROR`. Пропуски в
  /// журнал не попадают.
  pub fn move_file(&self, source: &Path) -> MoveOutcome {
    let outcome = self.attempt(source);
    let name = display_name(source);

    match &outcome {
      MoveOutcome::Moved {
        category,
        final_path,
      } => {
        debug!("Moved {} -> {}", source.display(), final_path.display());
        self.log.moved(&name, category);
      }
      MoveOutcome::Skipped(reason) => {
        debug!("Skipped {}: {reason}", source.display());
      }
      MoveOutcome::Failed(err) => {
        debug!("Failed to move {}: {err}", source.display());
        self.log.move_failed(&name, err);
      }
    }

    outcome
  }

  fn attempt(&self, source: &Path) -> MoveOutcome {
    if self.is_log_file(source) {
      return MoveOutcome::Skipped(SkipReason::LogFile);
    }

    let Some(category) = self.categories.classify_path(source) else {
      return MoveOutcome::Skipped(SkipReason::NoMatchingCategory);
    };

    match self.relocate(source, category.name()) {
      Ok(final_path) => MoveOutcome::Moved {
        category: category.name().to_string(),
        final_path,
      },
      Err(err) => MoveOutcome::Failed(err),
    }
  }

  fn relocate(&self, source: &Path, category: &str) -> Result<PathBuf> {
    let file_name = source
      .file_name()
      .ok_or_else(|| OrganizerError::FileNameMissing(source.to_path_buf()))?;

    let dest_dir = self.root.join(category);
    // create_dir_all не падает, если директорию параллельно создал кто-то ещё
    fs::create_dir_all(&dest_dir).map_err(|e| OrganizerError::CreateCategoryDir {
      path: dest_dir.clone(),
      source: e,
    })?;

    // Между проверкой имени и rename есть узкое окно гонки; обработка
    // событий последовательная, поэтому внутри сервиса оно не возникает.
    let destination = namer::resolve(&dest_dir, file_name);
    move_path(source, &destination).map_err(|e| OrganizerError::MoveFile {
      from: source.to_path_buf(),
      to: destination.clone(),
      source: e,
    })?;

    Ok(destination)
  }
}

/// rename, а между устройствами — copy + remove.
fn move_path(from: &Path, to: &Path) -> io::Result<()> {
  match fs::rename(from, to) {
    Ok(()) => Ok(()),
    Err(e) if is_cross_device(&e) => copy_then_remove(from, to),
    Err(e) => Err(e),
  }
}

/// При любой ошибке `to` удаляется: файл не должен остаться ни обрезанным
/// в категории, ни в двух местах сразу.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
  if let Err(e) = fs::copy(from, to) {
    discard_partial(to);
    return Err(e);
  }
  if let Err(e) = fs::remove_file(from) {
    discard_partial(to);
    return Err(e);
  }
  Ok(())
}

fn discard_partial(path: &Path) {
  match fs::remove_file(path) {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => warn!("Failed to remove partial copy {}: {}", path.display(), e),
  }
}

fn is_cross_device(err: &io::Error) -> bool {
  // EXDEV на unix, ERROR_NOT_SAME_DEVICE на windows
  #[cfg(unix)]
  const CROSS_DEVICE: i32 = 18;
  #[cfg(windows)]
  const CROSS_DEVICE: i32 = 17;
  #[cfg(not(any(unix, windows)))]
  const CROSS_DEVICE: i32 = -1;

  err.raw_os_error() == Some(CROSS_DEVICE)
}

fn display_name(path: &Path) -> String {
  path.file_name().map_or_else(
    || path.display().to_string(),
    |n| n.to_string_lossy().to_string(),
  )
}
