use std::path::PathBuf;

/// Единый тип ошибок организатора.
#[derive(thiserror::Error, Debug)]
pub enum OrganizerError {
  #[error("Downloads directory is not available on this OS/user")]
  DownloadsDirNotFound,

  #[error("Invalid path: {0}")]
  InvalidPath(String),

  #[error("Folder {0} not found.")]
  WatchRootNotFound(PathBuf),

  #[error("{0} is not a directory")]
  WatchRootNotADirectory(PathBuf),

  #[error("Invalid extension {extension:?} in category {category}")]
  InvalidExtension { category: String, extension: String },

  #[error("Extension {extension} is listed under both {first} and {second}")]
  DuplicateExtension {
    extension: String,
    first: String,
    second: String,
  },

  #[error("cannot create directory {}: {source}", path.display())]
  CreateCategoryDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot move {} to {}: {source}", from.display(), to.display())]
  MoveFile {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Notify error: {0}")]
  Notify(#[from] notify::Error),

  #[error("Cannot determine file name for path: {0:?}")]
  FileNameMissing(PathBuf),
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
