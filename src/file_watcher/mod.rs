//! Модуль мониторинга файловой системы.
//!
//! Отвечает за:
//! - подписку `notify` на корень наблюдения (без рекурсии)
//! - отбор событий появления файлов
//! - debounce перед обработкой
//! - последовательную передачу файлов в [`Mover`]
//! - graceful shutdown
//!
//! Callback `notify` только кладёт событие в канал; всё остальное делает
//! один рабочий поток, поэтому перемещения никогда не идут параллельно.

mod events;

pub use events::{DebounceQueue, PendingEvent};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::OrganizerError;
use crate::mover::{MoveOutcome, Mover};

/// Как часто рабочий поток проверяет сигнал остановки, если событий нет.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Состояние watcher'а.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
  Stopped,
  Running,
  /// Сигнал остановки получен, текущее перемещение дорабатывает.
  Stopping,
}

impl WatcherState {
  fn from_u8(v: u8) -> Self {
    match v {
      1 => Self::Running,
      2 => Self::Stopping,
      _ => Self::Stopped,
    }
  }

  fn as_u8(self) -> u8 {
    match self {
      Self::Stopped => 0,
      Self::Running => 1,
      Self::Stopping => 2,
    }
  }
}

#[derive(Debug, Clone)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
  fn new(state: WatcherState) -> Self {
    Self(Arc::new(AtomicU8::new(state.as_u8())))
  }

  fn get(&self) -> WatcherState {
    WatcherState::from_u8(self.0.load(Ordering::SeqCst))
  }

  fn set(&self, state: WatcherState) {
    self.0.store(state.as_u8(), Ordering::SeqCst);
  }
}

/// Handle запущенного watcher'а.
pub struct WatcherHandle {
  stop_tx: mpsc::Sender<()>,
  join: Option<thread::JoinHandle<()>>,
  watcher: Option<RecommendedWatcher>,
  watch_dir: PathBuf,
  state: SharedState,
}

impl WatcherHandle {
  pub fn watch_dir(&self) -> &Path {
    &self.watch_dir
  }

  pub fn state(&self) -> WatcherState {
    self.state.get()
  }

  /// Подать сигнал остановки, не дожидаясь потока.
  ///
  /// Новые уведомления больше не принимаются. Файлы, которые уже ждут
  /// debounce, и текущее перемещение доводятся до конца; пока это идёт,
  /// [`state`](Self::state) возвращает `Stopping`.
  pub fn request_stop(&self) {
    if self.state.get() == WatcherState::Running {
      self.state.set(WatcherState::Stopping);
      let _ = self.stop_tx.send(());
    }
  }

  /// Остановить watcher и дождаться завершения потока.
  pub fn stop(mut self) -> Result<(), OrganizerError> {
    self.shutdown();
    Ok(())
  }

  fn shutdown(&mut self) {
    self.request_stop();
    // Drop notify watcher: источник событий закрывается.
    self.watcher.take();
    if let Some(join) = self.join.take() {
      if join.join().is_err() {
        error!("Watcher thread panicked");
      }
    }
    self.state.set(WatcherState::Stopped);
  }
}

impl Drop for WatcherHandle {
  fn drop(&mut self) {
    if self.join.is_some() {
      self.shutdown();
    }
  }
}

/// Запустить watcher.
///
/// `mover` переезжает в рабочий поток. `on_processed` вызывается после
/// каждой попытки перемещения (для пропусков тоже).
pub fn start_watcher(
  mover: Mover,
  debounce: Duration,
  on_processed: impl Fn(&Path, &MoveOutcome) + Send + 'static,
) -> Result<WatcherHandle, OrganizerError> {
  let watch_dir = mover.root().to_path_buf();
  info!("Starting watcher for: {}", watch_dir.display());

  let (stop_tx, stop_rx) = mpsc::channel::<()>();
  let (event_tx, event_rx) = mpsc::channel::<Result<Event, notify::Error>>();

  let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
    // best-effort send; если receiver уже закрыт — просто игнорируем.
    let _ = event_tx.send(res);
  })?;
  watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

  let state = SharedState::new(WatcherState::Running);
  let worker_state = state.clone();

  let join = thread::Builder::new()
    .name("organizer-watcher".to_string())
    .spawn(move || {
      run_worker(&mover, debounce, &event_rx, &stop_rx, &on_processed);
      worker_state.set(WatcherState::Stopped);
      info!("Watcher thread finished");
    })?;

  Ok(WatcherHandle {
    stop_tx,
    join: Some(join),
    watcher: Some(watcher),
    watch_dir,
    state,
  })
}

fn run_worker(
  mover: &Mover,
  debounce: Duration,
  event_rx: &mpsc::Receiver<Result<Event, notify::Error>>,
  stop_rx: &mpsc::Receiver<()>,
  on_processed: &dyn Fn(&Path, &MoveOutcome),
) {
  let mut queue = DebounceQueue::new(debounce);

  loop {
    // 1) graceful shutdown
    if stop_requested(stop_rx) {
      info!("Watcher shutdown requested");
      // события, пришедшие до сигнала, ещё считаются
      while let Ok(res) = event_rx.try_recv() {
        enqueue(&mut queue, res);
      }
      break;
    }

    // 2) приём событий notify; ждём не дольше, чем до ближайшего готового
    let timeout = queue
      .time_until_due(Instant::now())
      .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));

    match event_rx.recv_timeout(timeout) {
      Ok(res) => enqueue(&mut queue, res),
      Err(mpsc::RecvTimeoutError::Timeout) => {
        // тик
      }
      Err(mpsc::RecvTimeoutError::Disconnected) => {
        if stop_requested(stop_rx) {
          info!("Watcher shutdown requested");
        } else {
          warn!("notify channel disconnected");
        }
        break;
      }
    }

    // 3) обработка готовых событий, по одному
    while let Some(event) = queue.pop_due(Instant::now()) {
      process(mover, &event, on_processed);
    }
  }

  // 4) drain: дожидаемся debounce уже обнаруженных файлов
  if !queue.is_empty() {
    debug!("Draining {} pending event(s) before stop", queue.len());
  }
  while let Some(wait) = queue.time_until_due(Instant::now()) {
    thread::sleep(wait);
    while let Some(event) = queue.pop_due(Instant::now()) {
      process(mover, &event, on_processed);
    }
  }
}

fn enqueue(queue: &mut DebounceQueue, res: Result<Event, notify::Error>) {
  match res {
    Ok(event) => {
      trace!("notify event: {:?}", event);
      for path in arrival_paths(&event) {
        if queue.push(path.clone(), Instant::now()) {
          debug!("Queued {}", path.display());
        }
      }
    }
    Err(err) => warn!("notify error: {err}"),
  }
}

fn stop_requested(stop_rx: &mpsc::Receiver<()>) -> bool {
  match stop_rx.try_recv() {
    Ok(()) | Err(mpsc::TryRecvError::Disconnected) => true,
    Err(mpsc::TryRecvError::Empty) => false,
  }
}

fn process(mover: &Mover, event: &PendingEvent, on_processed: &dyn Fn(&Path, &MoveOutcome)) {
  if !mover.is_log_file(&event.path) {
    mover.activity_log().detected(&event.path);
  }
  debug!(
    "Processing {} ({:?} after detection)",
    event.path.display(),
    event.detected_at.elapsed()
  );
  let outcome = mover.move_file(&event.path);
  on_processed(&event.path, &outcome);
}

/// Пути файлов, которые появились в корне.
///
/// Создание директорий игнорируется. Переименование внутри корня тоже
/// считается появлением: браузеры докачивают во временный файл и потом
/// переименовывают его.
fn arrival_paths(event: &Event) -> Vec<PathBuf> {
  match &event.kind {
    EventKind::Create(CreateKind::Folder) => Vec::new(),
    EventKind::Create(CreateKind::File) => event.paths.clone(),
    // Некоторые FS/драйверы могут отдавать CreateKind::Any.
    EventKind::Create(_) => regular_files(event.paths.iter()),
    EventKind::Modify(ModifyKind::Name(RenameMode::To)) => regular_files(event.paths.iter()),
    EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
      [from, to] if from.parent() == to.parent() => regular_files(std::iter::once(to)),
      _ => Vec::new(),
    },
    EventKind::Modify(_) => Vec::new(),
    EventKind::Remove(_) => Vec::new(),
    EventKind::Access(_) => Vec::new(),
    EventKind::Other => Vec::new(),
    EventKind::Any => Vec::new(),
  }
}

fn regular_files<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Vec<PathBuf> {
  paths.filter(|p| is_regular_file(p)).cloned().collect()
}

fn is_regular_file(path: &Path) -> bool {
  match std::fs::metadata(path) {
    Ok(m) => m.is_file(),
    Err(_) => false,
  }
}
