//! Process-local record store. One `MemoryStore` per record type; every call
//! takes the collection lock once, so each call is atomic on its own.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{AppError, Result};

pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> u64;
}

#[derive(Debug)]
struct Rows<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

#[derive(Debug)]
pub struct MemoryStore<T> {
    inner: RwLock<Rows<T>>,
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E>(_: E) -> AppError {
    AppError::Storage("record store lock poisoned".to_string())
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        MemoryStore {
            inner: RwLock::new(Rows { next_id: 1, rows: BTreeMap::new() }),
        }
    }

    /// Allocates the next id and stores whatever `build` makes of it.
    pub fn insert<F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(u64) -> Result<T>,
    {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let id = inner.next_id;
        let record = build(id)?;
        if record.id() != id {
            return Err(AppError::Storage(format!("record built for id {} reports id {}", id, record.id())));
        }
        inner.next_id += 1;
        inner.rows.insert(id, record.clone());
        Ok(record)
    }

    pub fn get(&self, id: u64) -> Result<Option<T>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.rows.get(&id).cloned())
    }

    /// Records matching `filter`, in id order.
    pub fn list<F>(&self, filter: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.rows.values().filter(|record| filter(record)).cloned().collect())
    }

    pub fn all(&self) -> Result<Vec<T>> {
        self.list(|_| true)
    }

    /// Applies `patch` to a copy of the record and commits it only if the
    /// patch succeeds. `Ok(None)` when the id is unknown.
    pub fn update<F>(&self, id: u64, patch: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let Some(current) = inner.rows.get(&id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        patch(&mut updated)?;
        inner.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }

    pub fn remove(&self, id: u64) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.rows.remove(&id).is_some())
    }

    /// Removes every record matching `filter`, returning how many went.
    pub fn remove_where<F>(&self, filter: F) -> Result<usize>
    where
        F: Fn(&T) -> bool,
    {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let before = inner.rows.len();
        inner.rows.retain(|_, record| !filter(record));
        Ok(before - inner.rows.len())
    }
}
