//! Downloads Organizer
//!
//! Следит за одной директорией (по умолчанию — папка загрузок) и раскладывает
//! новые файлы по поддиректориям-категориям по расширению. Каждое действие
//! пишется в журнал `organizer_history.log` в той же директории.

pub mod activity_log;
pub mod classifier;
pub mod config;
pub mod error;
pub mod file_watcher;
pub mod logging;
pub mod mover;
pub mod namer;
pub mod service;

pub use config::OrganizerConfig;
pub use error::{OrganizerError, Result};
pub use mover::{MoveOutcome, SkipReason};
