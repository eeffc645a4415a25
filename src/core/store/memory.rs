//! In-memory store.
//!
//! The reference implementation of the store contract. Contents are not
//! persisted in any way after the process ends.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::Store;
use crate::core::record::Record;
use crate::error::{Result, StoreError};

/// A process-local store guarded by a reader-writer lock.
///
/// `get` takes the shared lock; `put` and `delete` take the exclusive lock.
/// The existence check in `put` runs under the same exclusive lock as the
/// insertion, so concurrent writers cannot both pass it.
pub struct Memory {
    secrets: RwLock<HashMap<String, Record>>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            secrets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

impl Store for Memory {
    fn put(&self, name: &str, record: &Record) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let mut secrets = self
            .secrets
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if secrets.contains_key(name) {
            return Err(StoreError::AlreadyExists.into());
        }

        secrets.insert(name.to_string(), record.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Record> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let secrets = self.secrets.read().unwrap_or_else(PoisonError::into_inner);

        secrets
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound.into())
    }

    fn delete(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let mut secrets = self
            .secrets
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match secrets.remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound.into()),
        }
    }
}
