//! Классификация файлов по расширению.
//!
//! Таблица категорий строится один раз при старте и дальше не меняется.
//! Расширения хранятся в нижнем регистре вместе с ведущей точкой.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{OrganizerError, Result};

/// Категория назначения, например `Images`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
  name: String,
  extensions: Vec<String>,
}

impl Category {
  /// Имя категории, оно же имя поддиректории в корне наблюдения.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn extensions(&self) -> &[String] {
    &self.extensions
  }
}

/// Неизменяемая таблица `категория -> расширения`.
#[derive(Debug, Clone)]
pub struct CategoryTable {
  categories: Vec<Category>,
  by_extension: HashMap<String, usize>,
}

impl CategoryTable {
  /// Построить таблицу в порядке объявления.
  ///
  /// Каждое расширение должно начинаться с точки и встречаться ровно один раз
  /// во всей таблице, иначе это ошибка конфигурации.
  pub fn new<N, E, S>(entries: impl IntoIterator<Item = (N, E)>) -> Result<Self>
  where
    N: Into<String>,
    E: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut categories = Vec::new();
    let mut by_extension: HashMap<String, usize> = HashMap::new();

    for (name, extensions) in entries {
      let name = name.into();
      let index = categories.len();
      let mut normalized = Vec::new();

      for ext in extensions {
        let ext = ext.as_ref().trim().to_lowercase();
        if ext.len() < 2 || !ext.starts_with('.') {
          return Err(OrganizerError::InvalidExtension {
            category: name,
            extension: ext,
          });
        }
        if let Some(&first) = by_extension.get(&ext) {
          let first = categories
            .get(first)
            .map_or_else(|| name.clone(), |c: &Category| c.name.clone());
          return Err(OrganizerError::DuplicateExtension {
            extension: ext,
            first,
            second: name,
          });
        }
        by_extension.insert(ext.clone(), index);
        normalized.push(ext);
      }

      categories.push(Category {
        name,
        extensions: normalized,
      });
    }

    Ok(Self {
      categories,
      by_extension,
    })
  }

  /// Категория для расширения (с точкой), без учёта регистра.
  pub fn classify(&self, extension: &str) -> Option<&Category> {
    let key = extension.to_lowercase();
    self
      .by_extension
      .get(&key)
      .and_then(|&i| self.categories.get(i))
  }

  /// Категория для файла по его пути.
  pub fn classify_path(&self, path: &Path) -> Option<&Category> {
    extension_of(path).and_then(|ext| self.classify(&ext))
  }

  pub fn categories(&self) -> &[Category] {
    &self.categories
  }
}

/// Встроенная таблица категорий.
pub fn default_categories() -> Result<CategoryTable> {
  CategoryTable::new([
    (
      "Images",
      vec![".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp"],
    ),
    ("Documents", vec![".pdf", ".docx", ".txt", ".xlsx", ".pptx"]),
    ("Audio", vec![".mp3", ".wav"]),
    ("Video", vec![".mp4", ".mov", ".avi"]),
    ("Installers", vec![".exe", ".dmg", ".pkg", ".msi"]),
  ])
}

/// Расширение последнего компонента пути в виде `.ext`.
///
/// У dotfile (`.bashrc`) расширения нет.
pub fn extension_of(path: &Path) -> Option<String> {
  path
    .extension()
    .map(|ext| format!(".{}", ext.to_string_lossy()))
}
