//! Debounced write path for in-progress edits.
//!
//! [`AutoSaveController`] coalesces rapid edits for a date into a single store
//! write after a quiet period, and lets explicit saves supersede any pending
//! timer. At most one write is pending per key at any time.

pub mod schedule;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error};

use crate::{DateKey, NoteStore, Result};
use schedule::{schedule, TaskHandle};

/// Debounce window used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Configuration for [`AutoSaveController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// Quiet period after the latest edit before it is written.
    pub delay: Duration,
}

impl AutoSaveConfig {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self { delay: DEFAULT_DEBOUNCE }
    }
}

struct PendingEdit {
    body: String,
    generation: u64,
    timer: Option<TaskHandle>,
}

impl PendingEdit {
    fn cancel(&self) {
        if let Some(timer) = &self.timer {
            timer.cancel();
        }
    }
}

struct Inner {
    store: Arc<dyn NoteStore>,
    config: AutoSaveConfig,
    pending: Mutex<HashMap<DateKey, PendingEdit>>,
    // Held across "take pending body + write it" so a timer and a flush can
    // never interleave their writes for the same key.
    write_gate: tokio::sync::Mutex<()>,
    next_generation: AtomicU64,
}

impl Inner {
    fn pending(&self) -> MutexGuard<'_, HashMap<DateKey, PendingEdit>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the pending body for `key`, cancelling its timer.
    fn take(&self, key: &DateKey) -> Option<String> {
        let edit = self.pending().remove(key)?;
        edit.cancel();
        Some(edit.body)
    }

    /// Puts back a body whose write failed, unless a newer edit arrived meanwhile.
    fn restore(&self, key: DateKey, body: String) {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        self.pending().entry(key).or_insert(PendingEdit {
            body,
            generation,
            timer: None,
        });
    }

    async fn fire(&self, key: DateKey, generation: u64) {
        let _gate = self.write_gate.lock().await;

        let body = {
            let mut pending = self.pending();
            let current = pending
                .get(&key)
                .is_some_and(|edit| edit.generation == generation);
            if current {
                pending.remove(&key).map(|edit| edit.body)
            } else {
                None
            }
        };
        let Some(body) = body else {
            debug!("Auto-save timer for {} superseded", key);
            return;
        };

        let stored = self.store.get(&key).await.unwrap_or_default();
        if stored == body {
            debug!("Auto-save for {} skipped, note unchanged", key);
            return;
        }

        if let Err(e) = self.store.set(&key, &body).await {
            error!("Auto-save for {} failed: {}", key, e);
            self.restore(key, body);
        }
    }

    async fn write(&self, key: DateKey, body: String) -> Result<()> {
        if let Err(e) = self.store.set(&key, &body).await {
            self.restore(key, body);
            return Err(e);
        }
        Ok(())
    }
}

/// Coalesces edits into debounced writes against a [`NoteStore`].
///
/// Timers run on the tokio runtime and hold their own reference to the
/// controller state, so a write that is pending when the controller is dropped
/// still lands exactly once. Use [`AutoSaveController::discard`] to drop one.
#[derive(Clone)]
pub struct AutoSaveController {
    inner: Arc<Inner>,
}

impl AutoSaveController {
    pub fn new(store: Arc<dyn NoteStore>, config: AutoSaveConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                pending: Mutex::new(HashMap::new()),
                write_gate: tokio::sync::Mutex::new(()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> AutoSaveConfig {
        self.inner.config
    }

    /// Records `body` as the latest edit for `key` and re-arms its timer.
    ///
    /// Any timer already armed for `key` is cancelled first. Must be called
    /// from within a tokio runtime.
    pub fn on_edit(&self, key: DateKey, body: impl Into<String>) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.clone();
        let timer = schedule(self.inner.config.delay, async move {
            inner.fire(key, generation).await;
        });

        let previous = self.inner.pending().insert(
            key,
            PendingEdit {
                body: body.into(),
                generation,
                timer: Some(timer),
            },
        );
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Writes the latest recorded body for `key` now and cancels its timer.
    ///
    /// Returns `Ok(false)` if nothing was pending. On failure the body stays
    /// pending (without a timer) so a later flush can retry it.
    pub async fn flush(&self, key: &DateKey) -> Result<bool> {
        let _gate = self.inner.write_gate.lock().await;
        let Some(body) = self.inner.take(key) else {
            return Ok(false);
        };
        self.inner.write(*key, body).await?;
        Ok(true)
    }

    /// Explicit save: records `body` and writes it immediately.
    pub async fn save(&self, key: &DateKey, body: impl Into<String>) -> Result<()> {
        let _gate = self.inner.write_gate.lock().await;
        self.inner.take(key);
        self.inner.write(*key, body.into()).await
    }

    /// Ends the edit session for `key`, writing anything still pending.
    pub async fn close_session(&self, key: &DateKey) -> Result<bool> {
        self.flush(key).await
    }

    /// Drops the pending edit for `key` without writing it.
    pub fn discard(&self, key: &DateKey) -> Option<String> {
        self.inner.take(key)
    }

    /// Flushes every pending key. All keys are attempted; the first error is returned.
    pub async fn flush_all(&self) -> Result<()> {
        let mut first_err = None;
        for key in self.pending_keys() {
            if let Err(e) = self.flush(&key).await {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn has_pending(&self, key: &DateKey) -> bool {
        self.inner.pending().contains_key(key)
    }

    /// The latest recorded but unwritten body for `key`.
    pub fn pending_body(&self, key: &DateKey) -> Option<String> {
        self.inner.pending().get(key).map(|edit| edit.body.clone())
    }

    pub fn pending_keys(&self) -> Vec<DateKey> {
        let mut keys: Vec<DateKey> = self.inner.pending().keys().copied().collect();
        keys.sort();
        keys
    }
}
