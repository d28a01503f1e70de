#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use spendwise_core::{
    config::ConfigManager,
    domain::UserId,
    storage::JsonStore,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh application directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// JSON store and config manager rooted in an isolated directory.
pub fn setup_test_env() -> (JsonStore, ConfigManager) {
    let base = temp_base();
    let store = JsonStore::open(base.join("data"), Some(3)).expect("create json store");
    let config = ConfigManager::with_base_dir(base).expect("create config manager");
    (store, config)
}

pub fn demo_user() -> UserId {
    UserId::new("demo").expect("user id")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
