use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde_json::Value;
use uuid::Uuid;

use super::{row_id, row_owner, validate_row, Collection, RowStore};
use crate::{
    core::errors::{Result, SpendError},
    domain::UserId,
};

type Tables = HashMap<Collection, Vec<Value>>;

/// Process-local row store. Useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in `collection` across all owners.
    pub fn len(&self, collection: Collection) -> usize {
        self.read()
            .map(|tables| tables.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|c| self.len(*c) == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| SpendError::StorageError("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| SpendError::StorageError("memory store lock poisoned".into()))
    }
}

impl RowStore for MemoryStore {
    fn fetch_all(&self, collection: Collection, owner: &UserId) -> Result<Vec<Value>> {
        let tables = self.read()?;
        Ok(tables
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_owner(row) == Some(owner.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn insert(&self, collection: Collection, row: Value) -> Result<()> {
        let id = validate_row(&row)?;
        let mut tables = self.write()?;
        let rows = tables.entry(collection).or_default();
        if rows.iter().any(|existing| row_id(existing).ok() == Some(id)) {
            return Err(SpendError::StorageError(format!(
                "{collection} already contains row {id}"
            )));
        }
        rows.push(row);
        Ok(())
    }

    fn update(&self, collection: Collection, id: Uuid, row: Value) -> Result<()> {
        let row_id_value = validate_row(&row)?;
        if row_id_value != id {
            return Err(SpendError::MalformedRow(format!(
                "row id {row_id_value} does not match target {id}"
            )));
        }
        let mut tables = self.write()?;
        let slot = tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r).ok() == Some(id)))
            .ok_or(SpendError::NotFound { collection, id })?;
        *slot = row;
        Ok(())
    }

    fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        let mut tables = self.write()?;
        let rows = tables
            .get_mut(&collection)
            .ok_or(SpendError::NotFound { collection, id })?;
        let position = rows
            .iter()
            .position(|r| row_id(r).ok() == Some(id))
            .ok_or(SpendError::NotFound { collection, id })?;
        rows.remove(position);
        Ok(())
    }
}
