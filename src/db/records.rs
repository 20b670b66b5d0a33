use std::cell::RefCell;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CloError;

use super::connection;

/// Fixed envelope key every collection is stored under.
pub const ENVELOPE_KEY: &str = "data";

/// Load/save capability for one ordered collection.
///
/// Loading never fails: a missing or unreadable source yields an empty
/// collection.
pub trait Persist<T> {
    fn load(&self) -> Vec<T>;
    fn save(&self, records: &[T]) -> Result<(), CloError>;
}

/// A collection serialized as one JSON document inside a SQLite file.
pub struct SqliteRecords<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SqliteRecords<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: DeserializeOwned> SqliteRecords<T> {
    fn try_load(&self) -> Result<Vec<T>, CloError> {
        let conn = connection::open_store(&self.path)?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM envelope WHERE key = ?1",
                params![ENVELOPE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

impl<T: Serialize + DeserializeOwned> Persist<T> for SqliteRecords<T> {
    fn load(&self) -> Vec<T> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no store yet, starting empty");
            return Vec::new();
        }
        match self.try_load() {
            Ok(records) => {
                debug!(path = %self.path.display(), count = records.len(), "loaded records");
                records
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store unreadable, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[T]) -> Result<(), CloError> {
        let payload = serde_json::to_string(records)?;
        let conn = connection::open_or_replace_store(&self.path)?;
        conn.execute(
            "INSERT INTO envelope (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![ENVELOPE_KEY, payload],
        )?;
        debug!(path = %self.path.display(), count = records.len(), "saved records");
        Ok(())
    }
}

/// In-memory collection. Clones share the same backing vector, so a test
/// can keep one handle and inspect what was saved through another.
pub struct MemoryRecords<T> {
    inner: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for MemoryRecords<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for MemoryRecords<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> MemoryRecords<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(records)),
        }
    }
}

impl<T: Clone> MemoryRecords<T> {
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.borrow().clone()
    }
}

impl<T: Clone> Persist<T> for MemoryRecords<T> {
    fn load(&self) -> Vec<T> {
        self.snapshot()
    }

    fn save(&self, records: &[T]) -> Result<(), CloError> {
        *self.inner.borrow_mut() = records.to_vec();
        Ok(())
    }
}
