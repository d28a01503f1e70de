//! Row-store abstraction over the named collections the application persists.
//!
//! Backends only see untyped JSON rows carrying `id` and `user_id`. The typed helpers at the
//! bottom of this module convert to and from domain entities.

pub mod json_backend;
pub mod memory;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    core::errors::{Result, SpendError},
    domain::{Goal, Identifiable, Owned, RecurringTemplate, TransactionInstance, UserId},
};

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

/// Named collections held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    RecurringTemplates,
    Transactions,
    Goals,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::RecurringTemplates,
        Collection::Transactions,
        Collection::Goals,
    ];

    /// Table name used by backends.
    pub fn name(self) -> &'static str {
        match self {
            Collection::RecurringTemplates => "recurring_transactions",
            Collection::Transactions => "transactions",
            Collection::Goals => "goals",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Abstraction over persistence backends holding user-owned rows.
pub trait RowStore: Send + Sync {
    /// Rows of `collection` owned by `owner`, in insertion order.
    fn fetch_all(&self, collection: Collection, owner: &UserId) -> Result<Vec<Value>>;
    fn insert(&self, collection: Collection, row: Value) -> Result<()>;
    /// Replaces the row whose id is `id`.
    fn update(&self, collection: Collection, id: Uuid, row: Value) -> Result<()>;
    fn delete(&self, collection: Collection, id: Uuid) -> Result<()>;
}

/// Extracts the `id` of a row, rejecting rows without one.
pub fn row_id(row: &Value) -> Result<Uuid> {
    let raw = row
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| SpendError::MalformedRow("row has no string `id`".into()))?;
    Uuid::parse_str(raw)
        .map_err(|err| SpendError::MalformedRow(format!("row id `{raw}` is not a uuid: {err}")))
}

/// Owner of a row, if it carries one.
pub fn row_owner(row: &Value) -> Option<&str> {
    row.get("user_id").and_then(Value::as_str)
}

/// Checks the shape every backend requires before accepting a row.
pub(crate) fn validate_row(row: &Value) -> Result<Uuid> {
    if !row.is_object() {
        return Err(SpendError::MalformedRow("row must be a JSON object".into()));
    }
    let id = row_id(row)?;
    if row_owner(row).map_or(true, |owner| owner.trim().is_empty()) {
        return Err(SpendError::MalformedRow(format!(
            "row {id} has no `user_id`"
        )));
    }
    Ok(id)
}

/// Entity persisted as a row of a fixed collection.
pub trait Record: Identifiable + Owned + Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

impl Record for RecurringTemplate {
    const COLLECTION: Collection = Collection::RecurringTemplates;
}

impl Record for TransactionInstance {
    const COLLECTION: Collection = Collection::Transactions;
}

impl Record for Goal {
    const COLLECTION: Collection = Collection::Goals;
}

/// Rows that decoded, plus how many were skipped.
#[derive(Debug)]
pub struct Decoded<R> {
    pub records: Vec<R>,
    pub skipped: usize,
}

/// Fetches and decodes every row; any undecodable row fails the whole call.
pub fn fetch_records<R: Record>(store: &dyn RowStore, owner: &UserId) -> Result<Vec<R>> {
    store
        .fetch_all(R::COLLECTION, owner)?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(SpendError::from))
        .collect()
}

/// Fetches rows, skipping the ones that no longer decode (e.g. hand-edited frequencies).
pub fn fetch_records_lossy<R: Record>(store: &dyn RowStore, owner: &UserId) -> Result<Decoded<R>> {
    let rows = store.fetch_all(R::COLLECTION, owner)?;
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match serde_json::from_value::<R>(row.clone()) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                let id = row.get("id").and_then(Value::as_str).unwrap_or("?");
                tracing::warn!(
                    collection = %R::COLLECTION,
                    id,
                    error = %err,
                    "skipping undecodable row"
                );
            }
        }
    }
    Ok(Decoded { records, skipped })
}

pub fn insert_record<R: Record>(store: &dyn RowStore, record: &R) -> Result<()> {
    store.insert(R::COLLECTION, serde_json::to_value(record)?)
}

pub fn update_record<R: Record>(store: &dyn RowStore, record: &R) -> Result<()> {
    store.update(R::COLLECTION, record.id(), serde_json::to_value(record)?)
}

pub fn delete_record<R: Record>(store: &dyn RowStore, id: Uuid) -> Result<()> {
    store.delete(R::COLLECTION, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_need_id_and_owner() {
        let id = Uuid::new_v4();
        assert!(validate_row(&json!({"id": id.to_string(), "user_id": "u"})).is_ok());
        assert!(matches!(
            validate_row(&json!({"user_id": "u"})),
            Err(SpendError::MalformedRow(_))
        ));
        assert!(matches!(
            validate_row(&json!({"id": id.to_string(), "user_id": " "})),
            Err(SpendError::MalformedRow(_))
        ));
        assert!(matches!(
            validate_row(&json!({"id": "nope", "user_id": "u"})),
            Err(SpendError::MalformedRow(_))
        ));
        assert!(validate_row(&json!([1, 2])).is_err());
    }

    #[test]
    fn lossy_fetch_skips_rows_that_do_not_decode() {
        let store = MemoryStore::new();
        let owner = UserId::new("demo").unwrap();
        let goal = Goal::from_input(
            owner.clone(),
            crate::domain::NewGoal::new("Bike", 300.0),
            chrono::Utc::now(),
        )
        .unwrap();
        insert_record(&store, &goal).unwrap();
        store
            .insert(
                Collection::Goals,
                json!({"id": Uuid::new_v4().to_string(), "user_id": "demo", "name": 7}),
            )
            .unwrap();

        let decoded = fetch_records_lossy::<Goal>(&store, &owner).unwrap();
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.records, vec![goal]);
        assert!(fetch_records::<Goal>(&store, &owner).is_err());
    }

    #[test]
    fn collection_names_match_tables() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["recurring_transactions", "transactions", "goals"]);
    }
}
