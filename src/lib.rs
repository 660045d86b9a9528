//! Daynote Store keeps one free-text note per calendar day.
//!
//! Notes are stored under a canonical [`DateKey`] (`YYYY-MM-DD`) inside a flat
//! key-value namespace, written atomically to disk, and can be searched with
//! case-insensitive substring matching that produces highlighted excerpts.
//!
//! ## Core Components
//! - [`datekey`]: Canonical date <-> key conversion.
//! - [`engine`]: The storage backend (in-memory with optional persistence).
//! - [`autosave`]: Debounced write path for in-progress edits.
//! - [`search`]: Linear-scan search with excerpt windowing and highlight spans.
//! - [`analytics`]: Summary statistics, recent notes and calendar indicators.

pub mod analytics;
pub mod autosave;
pub mod datekey;
pub mod engine;
pub mod search;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use datekey::DateKey;

/// Errors returned by the note store.
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied date is not a valid calendar date in the supported range.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// A storage key does not have the `YYYY-MM-DD` note key shape.
    #[error("invalid note key: {0}")]
    InvalidKey(String),
    /// A write could not be made durable. The store is left unchanged.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// An I/O error occurred while opening or reading the data directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for note store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Prefix that marks a raw storage key as a note key.
pub const NOTE_KEY_PREFIX: &str = "monitor-note-";

/// One stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub key: DateKey,
    pub body: String,
}

impl NoteEntry {
    pub fn new(key: DateKey, body: impl Into<String>) -> Self {
        Self { key, body: body.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Number of Unicode scalar values in the body.
    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }

    /// Number of whitespace-separated tokens.
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }

    /// Number of lines; zero for an empty body.
    pub fn line_count(&self) -> usize {
        if self.body.is_empty() {
            0
        } else {
            self.body.matches('\n').count() + 1
        }
    }
}

/// Read access to notes. Reads are total: storage trouble reads as "absent".
#[async_trait]
pub trait NoteReader: Send + Sync {
    /// Returns the current body for `key`, or `None` if there is no note.
    async fn get(&self, key: &DateKey) -> Option<String>;
}

/// Write and delete operations. Failures surface as [`Error::Persistence`].
#[async_trait]
pub trait NoteWriter: Send + Sync {
    /// Upserts the body for `key`. An empty body removes the note.
    async fn set(&self, key: &DateKey, body: &str) -> Result<()>;
    /// Removes the note for `key`. Deleting an absent note is a no-op.
    async fn delete(&self, key: &DateKey) -> Result<()>;
}

/// Enumerates every note currently held by the store.
#[async_trait]
pub trait NoteEnumeration: Send + Sync {
    /// Returns all note entries in unspecified order.
    ///
    /// Foreign keys in the same namespace are ignored, and note keys that do
    /// not parse are skipped with a warning.
    async fn enumerate(&self) -> Vec<NoteEntry>;
}

/// The primary interface for interacting with a note store.
#[async_trait]
pub trait NoteStore: NoteReader + NoteWriter + NoteEnumeration {
    /// Whether a non-empty note exists for `key`. Used for calendar indicators.
    async fn has_note(&self, key: &DateKey) -> bool {
        self.get(key).await.is_some_and(|body| !body.is_empty())
    }
}
