//! Подбор свободного имени в директории назначения.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Свободный путь для `filename` внутри `dest_dir`.
///
/// Если `dest_dir/filename` не существует, он и возвращается. Иначе между
/// stem и расширением вставляется токен — Unix-время в секундах.
/// Имя не обязано быть UTF-8: байты переносятся как есть.
pub fn resolve(dest_dir: &Path, filename: impl AsRef<OsStr>) -> PathBuf {
  resolve_with_token(dest_dir, filename, chrono::Utc::now().timestamp())
}

/// То же, что [`resolve`], но с явным токеном.
///
/// Если `<stem>_<token><ext>` тоже занят (две коллизии за одну секунду),
/// добавляется счётчик: `<stem>_<token>_1<ext>`, `<stem>_<token>_2<ext>`, ...
pub fn resolve_with_token(dest_dir: &Path, filename: impl AsRef<OsStr>, token: i64) -> PathBuf {
  let filename = filename.as_ref();
  let direct = dest_dir.join(filename);
  if !exists(&direct) {
    return direct;
  }

  let candidate = dest_dir.join(suffixed(filename, &format!("_{token}")));
  if !exists(&candidate) {
    return candidate;
  }

  let mut counter: u64 = 1;
  loop {
    let candidate = dest_dir.join(suffixed(filename, &format!("_{token}_{counter}")));
    if !exists(&candidate) {
      return candidate;
    }
    counter += 1;
  }
}

/// Вставляет `suffix` между stem и последним расширением:
/// `archive.tar.gz` -> `archive.tar<suffix>.gz`.
///
/// У dotfile (`.bashrc`) расширения нет, суффикс идёт в конец.
fn suffixed(filename: &OsStr, suffix: &str) -> OsString {
  let name = Path::new(filename);
  let mut out = OsString::with_capacity(filename.len() + suffix.len());
  out.push(name.file_stem().unwrap_or(filename));
  out.push(suffix);
  if let Some(ext) = name.extension() {
    out.push(".");
    out.push(ext);
  }
  out
}

// broken symlink тоже занимает имя
fn exists(path: &Path) -> bool {
  path.symlink_metadata().is_ok()
}
