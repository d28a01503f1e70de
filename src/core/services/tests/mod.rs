mod recurring_service_tests;

use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::core::clock::FixedClock;
use crate::core::errors::{Result, SpendError};
use crate::domain::UserId;
use crate::storage::{Collection, MemoryStore, RowStore};

pub(super) fn user(raw: &str) -> UserId {
    UserId::new(raw).unwrap()
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(super) fn clock_on(y: i32, m: u32, d: u32) -> FixedClock {
    FixedClock::on(date(y, m, d))
}

/// Memory store that refuses writes to selected collections.
#[derive(Default)]
pub(super) struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_insert: Option<Collection>,
    pub fail_update: Option<Collection>,
}

impl RowStore for FlakyStore {
    fn fetch_all(&self, collection: Collection, owner: &UserId) -> Result<Vec<Value>> {
        self.inner.fetch_all(collection, owner)
    }

    fn insert(&self, collection: Collection, row: Value) -> Result<()> {
        if self.fail_insert == Some(collection) {
            return Err(SpendError::StorageError("insert refused".into()));
        }
        self.inner.insert(collection, row)
    }

    fn update(&self, collection: Collection, id: Uuid, row: Value) -> Result<()> {
        if self.fail_update == Some(collection) {
            return Err(SpendError::StorageError("update refused".into()));
        }
        self.inner.update(collection, id, row)
    }

    fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        self.inner.delete(collection, id)
    }
}
