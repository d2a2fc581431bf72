use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use muxlog_core::{LogError, LogLevel, Sink, report_failure};

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn validate_key(key: &str) -> Result<&str, LogError> {
    if key.trim().is_empty() {
        Err(LogError::InvalidKey(key.into()))
    } else {
        Ok(key)
    }
}

/// Runs a sink operation, reporting errors and panics on the fallback channel.
fn guarded(key: &str, action: &str, op: impl FnOnce() -> Result<(), LogError>) {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => report_failure(&format!("{action} on sink {key:?}"), &err),
        Err(_) => report_failure(&format!("{action} on sink {key:?}"), &"sink panicked"),
    }
}

thread_local! {
    /// Registries dispatching on this thread, innermost last.
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a registry as dispatching on the current thread until dropped.
struct DispatchGuard {
    _private: (),
}

impl DispatchGuard {
    /// Returns `None` if this thread is already dispatching through `registry`,
    /// i.e. a sink is logging from inside its own emit.
    fn enter(registry: &Registry) -> Option<Self> {
        let id = registry as *const Registry as usize;
        DISPATCHING
            .with_borrow_mut(|active| {
                if active.contains(&id) {
                    false
                } else {
                    active.push(id);
                    true
                }
            })
            .then_some(Self { _private: () })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with_borrow_mut(|active| active.pop());
    }
}

struct SlotState {
    sink: Box<dyn Sink>,
    closed: bool,
}

/// A registered sink behind its own lock, so emits on different sinks never
/// contend on the registry map.
struct SinkSlot {
    state: Mutex<SlotState>,
}

impl SinkSlot {
    fn new(sink: Box<dyn Sink>) -> Self {
        Self {
            state: Mutex::new(SlotState {
                sink,
                closed: false,
            }),
        }
    }

    fn dispatch(&self, message: &str, level: LogLevel) -> Result<(), LogError> {
        let mut state = lock(&self.state);
        // Shut down after the snapshot was taken.
        if state.closed {
            return Ok(());
        }
        let line = state.sink.format(message, level);
        state.sink.emit(&line)
    }

    fn shutdown(&self) -> Result<(), LogError> {
        let mut state = lock(&self.state);
        if std::mem::replace(&mut state.closed, true) {
            return Ok(());
        }
        state.sink.shutdown()
    }
}

/// Set of named sinks receiving every logged message.
///
/// The map lock is only held to mutate or snapshot the map. Emits and
/// shutdowns run without it, so a slow sink never blocks registration.
/// Sinks are dispatched to in ascending key order.
pub struct Registry {
    sinks: Mutex<BTreeMap<String, Arc<SinkSlot>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("sinks", &self.keys())
            .finish()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown_all();
    }
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            sinks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Formats and emits `message` on every sink registered when the call starts.
    /// Sink failures are reported on stderr and never returned.
    ///
    /// A sink logging through the same registry from inside its own emit would
    /// relock its slot, so such nested calls are reported and dropped.
    pub fn log(&self, message: &str, level: LogLevel) {
        let Some(_dispatching) = DispatchGuard::enter(self) else {
            report_failure("nested log call from inside a sink dropped", &message);
            return;
        };
        let snapshot: Vec<(String, Arc<SinkSlot>)> = lock(&self.sinks)
            .iter()
            .map(|(key, slot)| (key.clone(), Arc::clone(slot)))
            .collect();
        for (key, slot) in snapshot {
            guarded(&key, "emit", || slot.dispatch(message, level));
        }
    }

    pub fn error(&self, message: &str) {
        self.log(message, LogLevel::Error);
    }

    pub fn info(&self, message: &str) {
        self.log(message, LogLevel::Info);
    }

    pub fn debug(&self, message: &str) {
        self.log(message, LogLevel::Debug);
    }

    /// Registers `sink` under `key`. A sink already holding the key is shut
    /// down before the new one takes its place. While that shutdown runs the
    /// key is absent: concurrent `log` calls reach neither sink and a
    /// concurrent `unregister(key)` returns `false`.
    pub fn register<S: Sink + 'static>(&self, key: &str, sink: S) -> Result<(), LogError> {
        let key = validate_key(key)?;
        let slot = Arc::new(SinkSlot::new(Box::new(sink)));
        let previous = lock(&self.sinks).remove(key);
        if let Some(previous) = previous {
            guarded(key, "shutdown", || previous.shutdown());
        }
        // Another thread may have claimed the key while the old sink shut down.
        let displaced = lock(&self.sinks).insert(key.to_owned(), slot);
        if let Some(displaced) = displaced {
            guarded(key, "shutdown", || displaced.shutdown());
        }
        Ok(())
    }

    /// Registers `sink` under its own name.
    pub fn add<S: Sink + 'static>(&self, sink: S) -> Result<(), LogError> {
        let key = sink.name().to_owned();
        self.register(&key, sink)
    }

    /// Shuts down and removes the sink under `key`. Returns `false` if no sink
    /// was registered there.
    pub fn unregister(&self, key: &str) -> Result<bool, LogError> {
        let key = validate_key(key)?;
        match self.take(key) {
            Ok(slot) => {
                guarded(key, "shutdown", || slot.shutdown());
                Ok(true)
            }
            Err(LogError::UnknownSink(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn take(&self, key: &str) -> Result<Arc<SinkSlot>, LogError> {
        lock(&self.sinks)
            .remove(key)
            .ok_or_else(|| LogError::UnknownSink(key.into()))
    }

    /// Shuts down every sink, best effort, and empties the registry.
    pub fn shutdown_all(&self) {
        let drained = std::mem::take(&mut *lock(&self.sinks));
        for (key, slot) in drained {
            guarded(&key, "shutdown", || slot.shutdown());
        }
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.sinks).keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.sinks).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.sinks).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.sinks).is_empty()
    }
}
