use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use uuid::Uuid;

use super::{row_id, row_owner, validate_row, Collection, RowStore};
use crate::{
    core::{
        errors::{Result, SpendError},
        utils::{ensure_dir, slugify_note, PathResolver},
    },
    domain::UserId,
};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const MANIFEST_FILE: &str = "manifest.json";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Row store keeping one pretty-printed JSON array per collection under `root`.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    write_lock: Mutex<()>,
}

/// Metadata stored alongside each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl JsonStore {
    pub fn open(root: impl Into<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        let backups_dir = PathResolver::backup_dir_in(&root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.name()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| SpendError::StorageError("json store lock poisoned".into()))
    }

    fn read_rows(&self, collection: Collection) -> Result<Vec<Value>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<Value> = serde_json::from_str(&data).map_err(|err| {
            SpendError::StorageError(format!("{} is not a JSON array: {err}", path.display()))
        })?;
        Ok(rows)
    }

    fn write_rows(&self, collection: Collection, rows: &[Value]) -> Result<()> {
        let path = self.collection_path(collection);
        let json = serde_json::to_string_pretty(rows)?;
        save_atomic(&path, &json)
    }

    /// Snapshots every collection file into `backups/<timestamp>[_<note>]`.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo> {
        self.backup_at(note, Utc::now())
    }

    pub fn backup_at(&self, note: Option<&str>, now: DateTime<Utc>) -> Result<BackupInfo> {
        let _guard = self.lock()?;
        let mut name = now.format(BACKUP_TIMESTAMP_FORMAT).to_string();
        if let Some(label) = slugify_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        let name = unique_name(&self.backups_dir, name);
        let dir = self.backups_dir.join(&name);
        ensure_dir(&dir)?;
        for collection in Collection::ALL {
            let source = self.collection_path(collection);
            if source.exists() {
                fs::copy(&source, dir.join(format!("{}.json", collection.name())))?;
            }
        }
        let info = BackupInfo {
            name,
            created_at: now,
            note: note.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
        };
        save_atomic(&dir.join(MANIFEST_FILE), &serde_json::to_string_pretty(&info)?)?;
        tracing::info!(backup = %info.name, "created data backup");
        self.prune_backups()?;
        Ok(info)
    }

    /// Snapshot names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        Ok(self
            .backup_details()?
            .into_iter()
            .map(|info| info.name)
            .collect())
    }

    /// Snapshot metadata, newest first.
    pub fn backup_details(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };
            match read_manifest(&path) {
                Some(info) => entries.push(info),
                None => {
                    if let Some(created_at) = parse_backup_timestamp(&name) {
                        entries.push(BackupInfo {
                            name,
                            created_at,
                            note: None,
                        });
                    }
                }
            }
        }
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    /// Replaces the live collection files with the snapshot `name`.
    pub fn restore(&self, name: &str) -> Result<()> {
        let dir = self.backups_dir.join(name);
        if name.trim().is_empty() || !dir.is_dir() {
            return Err(SpendError::StorageError(format!("backup `{name}` not found")));
        }
        let _guard = self.lock()?;
        for collection in Collection::ALL {
            let snapshot = dir.join(format!("{}.json", collection.name()));
            let data = if snapshot.exists() {
                fs::read_to_string(&snapshot)?
            } else {
                "[]".to_string()
            };
            save_atomic(&self.collection_path(collection), &data)?;
        }
        tracing::info!(backup = name, "restored data backup");
        Ok(())
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.backup_details()?;
        for stale in backups.iter().skip(self.retention) {
            let path = self.backups_dir.join(&stale.name);
            if let Err(err) = fs::remove_dir_all(&path) {
                tracing::warn!(backup = %stale.name, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl RowStore for JsonStore {
    fn fetch_all(&self, collection: Collection, owner: &UserId) -> Result<Vec<Value>> {
        let rows = self.read_rows(collection)?;
        tracing::debug!(%collection, rows = rows.len(), "loaded collection");
        Ok(rows
            .into_iter()
            .filter(|row| row_owner(row) == Some(owner.as_str()))
            .collect())
    }

    fn insert(&self, collection: Collection, row: Value) -> Result<()> {
        let id = validate_row(&row)?;
        let _guard = self.lock()?;
        let mut rows = self.read_rows(collection)?;
        if rows.iter().any(|existing| row_id(existing).ok() == Some(id)) {
            return Err(SpendError::StorageError(format!(
                "{collection} already contains row {id}"
            )));
        }
        rows.push(row);
        self.write_rows(collection, &rows)
    }

    fn update(&self, collection: Collection, id: Uuid, row: Value) -> Result<()> {
        let incoming = validate_row(&row)?;
        if incoming != id {
            return Err(SpendError::MalformedRow(format!(
                "row id {incoming} does not match target {id}"
            )));
        }
        let _guard = self.lock()?;
        let mut rows = self.read_rows(collection)?;
        let slot = rows
            .iter_mut()
            .find(|existing| row_id(existing).ok() == Some(id))
            .ok_or(SpendError::NotFound { collection, id })?;
        *slot = row;
        self.write_rows(collection, &rows)
    }

    fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        let _guard = self.lock()?;
        let mut rows = self.read_rows(collection)?;
        let before = rows.len();
        rows.retain(|existing| row_id(existing).ok() != Some(id));
        if rows.len() == before {
            return Err(SpendError::NotFound { collection, id });
        }
        self.write_rows(collection, &rows)
    }
}

fn read_manifest(dir: &Path) -> Option<BackupInfo> {
    let data = fs::read_to_string(dir.join(MANIFEST_FILE)).ok()?;
    serde_json::from_str(&data).ok()
}

fn unique_name(dir: &Path, base: String) -> String {
    if !dir.join(&base).exists() {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !dir.join(candidate).exists())
        .unwrap_or(base)
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let mut parts = name.split('_');
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    let time_digits = time_part.split('-').next()?;
    if !is_digits(date_part, 8) || !is_digits(time_digits, 4) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date_part}{time_digits}"), "%Y%m%d%H%M")
        .ok()
        .map(|naive| naive.and_utc())
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to a sibling temp file, syncs it, then renames it over `path`.
pub(crate) fn save_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
