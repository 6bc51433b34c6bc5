//! Внутренние типы событий file_watcher.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Новый файл, ещё не переданный в Mover.
#[derive(Clone, Debug)]
pub struct PendingEvent {
    /// Полный путь к файлу.
    pub path: PathBuf,
    /// Момент, когда пришло уведомление.
    pub detected_at: Instant,
}

/// Очередь отложенных событий (debounce).
///
/// Событие становится готовым через `debounce` после обнаружения. Путь,
/// который уже ждёт в очереди, повторно не добавляется.
#[derive(Debug)]
pub struct DebounceQueue {
    debounce: Duration,
    pending: VecDeque<PendingEvent>,
}

impl DebounceQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: VecDeque::new(),
        }
    }

    /// Добавить событие. `false`, если путь уже ждёт обработки.
    pub fn push(&mut self, path: PathBuf, detected_at: Instant) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.pending.push_back(PendingEvent { path, detected_at });
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.pending.iter().any(|e| e.path == path)
    }

    /// Сколько ждать до ближайшего готового события.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .front()
            .map(|e| (e.detected_at + self.debounce).saturating_duration_since(now))
    }

    /// Извлечь первое готовое событие.
    ///
    /// Очередь упорядочена по времени обнаружения, поэтому достаточно смотреть
    /// на голову.
    pub fn pop_due(&mut self, now: Instant) -> Option<PendingEvent> {
        match self.pending.front() {
            Some(e) if e.detected_at + self.debounce <= now => self.pending.pop_front(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
