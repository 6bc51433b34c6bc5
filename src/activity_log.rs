//! Журнал действий в корне наблюдения.
//!
//! Одна строка на событие: `YYYY-MM-DD HH:MM:SS - <message>`.
//! Файл открывается в режиме append; строка пишется одним `write_all`
//! под мьютексом, поэтому строки не перемешиваются.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;

use crate::error::Result;

pub const SERVICE_STARTED: &str = "--- Service Started: Monitoring Folder ---";
pub const SERVICE_STOPPED: &str = "--- Service Stopped by User ---";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct ActivityLog {
  path: PathBuf,
  file: Mutex<File>,
}

impl ActivityLog {
  /// Открыть (или создать) журнал для дозаписи.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok(Self {
      path,
      file: Mutex::new(file),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Дописать строку с текущим локальным временем.
  ///
  /// Ошибка записи не прерывает работу сервиса: она уходит в диагностический лог.
  pub fn record(&self, message: impl AsRef<str>) {
    let line = format_line(&chrono::Local::now(), message.as_ref());
    // Примечание: recover from poisoned mutex - журнал append-only,
    // частично записанной строки под локом быть не может.
    let mut file = self
      .file
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Err(e) = file.write_all(line.as_bytes()) {
      warn!("Failed to write activity log {}: {e}", self.path.display());
    }
  }

  pub fn detected(&self, path: &Path) {
    self.record(format!("Detected new file: {}", path.display()));
  }

  pub fn moved(&self, name: &str, category: &str) {
    self.record(format!("SUCCESS: Moved '{name}' to {category}"));
  }

  pub fn move_failed(&self, name: &str, cause: &dyn std::fmt::Display) {
    self.record(format!("ERROR moving {name}: {cause}"));
  }
}

fn format_line<Tz>(at: &chrono::DateTime<Tz>, message: &str) -> String
where
  Tz: chrono::TimeZone,
  Tz::Offset: std::fmt::Display,
{
  format!("{} - {}\n", at.format(TIMESTAMP_FORMAT), message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{NaiveDateTime, TimeZone, Utc};
  use std::fs;
  use std::sync::Arc;
  use std::thread;
  use tempfile::TempDir;

  #[test]
  fn test_format_line() {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
    assert_eq!(
      format_line(&at, "hello"),
      "2024-03-05 07:08:09 - hello\n"
    );
  }

  #[test]
  fn test_record_appends_timestamped_lines() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("organizer_history.log");
    fs::write(&path, "existing line\n").unwrap();

    let log = ActivityLog::open(&path).expect("Failed to open log");
    log.record(SERVICE_STARTED);
    log.moved("photo.JPG", "Images");

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "existing line");
    assert!(lines[1].ends_with(" - --- Service Started: Monitoring Folder ---"));
    assert!(lines[2].ends_with(" - SUCCESS: Moved 'photo.JPG' to Images"));

    let stamp = &lines[2][..19];
    assert!(NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
  }

  #[test]
  fn test_error_line_format() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("h.log");
    let log = ActivityLog::open(&path).unwrap();

    log.move_failed("a.pdf", &"Permission denied");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.trim_end().ends_with(" - ERROR moving a.pdf: Permission denied"));
  }

  #[test]
  fn test_concurrent_records_do_not_interleave() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("h.log");
    let log = Arc::new(ActivityLog::open(&path).unwrap());

    let workers: Vec<_> = (0..4)
      .map(|i| {
        let log = Arc::clone(&log);
        thread::spawn(move || {
          for j in 0..50 {
            log.record(format!("worker {i} line {j}"));
          }
        })
      })
      .collect();
    for w in workers {
      w.join().unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 200);
    for line in lines {
      assert!(line.contains(" - worker "), "broken line: {line}");
    }
  }
}
