use std::sync::{Arc, PoisonError, RwLock};
use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::Mutex;
use crate::{DateKey, Error, NoteEntry, NoteEnumeration, NoteReader, NoteStore, NoteWriter, Result};
use crate::engine::persistence::{Namespace, Persistence};

/// In-memory note store with optional disk persistence.
///
/// The map holds the whole raw namespace, so foreign keys loaded from disk are
/// kept and written back untouched. Writes are serialized by `write_gate` and
/// only become visible once the disk write succeeded.
///
/// Writes are cancel-safe: once the disk write has started, dropping the
/// `set`/`delete` future still lets it finish, swap the new map in and
/// release the gate, so disk and memory never disagree.
pub struct MemStore {
    data: Arc<RwLock<Namespace>>,
    persistence: Option<Arc<Persistence>>,
    write_gate: Arc<Mutex<()>>,
}

impl MemStore {
    pub fn new(initial_data: Namespace, persistence: Option<Arc<Persistence>>) -> Self {
        Self {
            data: Arc::new(RwLock::new(initial_data)),
            persistence,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// An empty store with no persistence.
    pub fn in_memory() -> Self {
        Self::new(Namespace::new(), None)
    }

    /// Returns a copy of the raw namespace, foreign keys included.
    pub fn raw_snapshot(&self) -> Namespace {
        self.data.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Applies `change` to a copy of the namespace, persists it, then swaps it in.
    async fn commit<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Namespace) -> bool,
    {
        let gate = self.write_gate.clone().lock_owned().await;

        let mut next = self.raw_snapshot();
        if !change(&mut next) {
            return Ok(());
        }

        let Some(p) = &self.persistence else {
            *self.data.write().unwrap_or_else(PoisonError::into_inner) = next;
            return Ok(());
        };

        // The gate and the swap travel with the blocking task.
        let p = p.clone();
        let data = self.data.clone();
        tokio::task::spawn_blocking(move || {
            let _gate = gate;
            p.save(&next)?;
            *data.write().unwrap_or_else(PoisonError::into_inner) = next;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Persistence(e.to_string()))?
        .map_err(|e| Error::Persistence(e.to_string()))
    }
}

#[async_trait]
impl NoteReader for MemStore {
    async fn get(&self, key: &DateKey) -> Option<String> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(&key.storage_key()).cloned()
    }
}

#[async_trait]
impl NoteWriter for MemStore {
    async fn set(&self, key: &DateKey, body: &str) -> Result<()> {
        if body.is_empty() {
            return self.delete(key).await;
        }
        let storage_key = key.storage_key();
        self.commit(|data| {
            if data.get(&storage_key).map(String::as_str) == Some(body) {
                debug!("Note {} unchanged, skipping write", storage_key);
                return false;
            }
            data.insert(storage_key.clone(), body.to_string());
            true
        })
        .await
    }

    async fn delete(&self, key: &DateKey) -> Result<()> {
        let storage_key = key.storage_key();
        self.commit(|data| data.remove(&storage_key).is_some()).await
    }
}

#[async_trait]
impl NoteEnumeration for MemStore {
    async fn enumerate(&self) -> Vec<NoteEntry> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.iter()
            .filter_map(|(raw, body)| match DateKey::from_storage_key(raw)? {
                Ok(key) => Some(NoteEntry::new(key, body.clone())),
                Err(e) => {
                    warn!("Skipping malformed note key {:?}: {}", raw, e);
                    None
                }
            })
            .collect()
    }
}

impl NoteStore for MemStore {}
