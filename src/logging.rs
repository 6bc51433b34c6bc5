//! Диагностическое логирование (консоль, stderr).
//!
//! Не путать с [`crate::activity_log`]: там история перемещений для
//! пользователя, здесь — отладочный вывод через фасад `log`.
//!
//! ## Уровни логов
//! - `ERROR`: watcher не смог запуститься или упал
//! - `WARN`:  ошибки `notify`, проблемы записи в журнал
//! - `INFO`:  события жизненного цикла (startup, shutdown)
//! - `DEBUG`: каждое событие ФС и каждый результат перемещения
//! - `TRACE`: сырые события `notify`
//!
//! ## Использование
//! ```ignore
//! use downloads_organizer::logging::init_logging;
//!
//! init_logging(); // вызывается один раз при старте
//!
//! log::info!(target: "downloads_organizer::file_watcher", "Starting watcher");
//! ```

use std::sync::Once;

use log::{Level, LevelFilter};
use std::io::Write;

static INIT: Once = Once::new();

/// Инициализировать логирование (idempotent).
///
/// Управление уровнем логов: переменная окружения `RUST_LOG`.
/// По умолчанию для нашего crate — `WARN`: в штатном режиме сервис
/// молчит в консоли, всё видно только в журнале.
/// Примеры:
/// - `RUST_LOG=info` — жизненный цикл
/// - `RUST_LOG=downloads_organizer=debug` — каждое событие
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .format(|buf, record| {
                let level = level_letter(record.level());
                let timestamp = console_timestamp();
                let target = record.target();

                // Формат: [timestamp] [LEVEL] [target] message
                writeln!(
                    buf,
                    "[{}] [{}] [{}] {}",
                    timestamp,
                    level,
                    target,
                    record.args()
                )
            })
            .filter_module("downloads_organizer", LevelFilter::Warn)
            .filter_module("notify", LevelFilter::Warn)
            .parse_env("RUST_LOG")
            .try_init();
    });
}

fn level_letter(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}

/// Локальное время с миллисекундами.
fn console_timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}
