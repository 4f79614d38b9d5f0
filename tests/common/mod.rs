use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tally::{
    config::Config,
    core::{storage::BlobStore, time::FixedClock},
    storage::JsonBlobStorage,
    Tally,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Creates a tracker backed by a unique data directory, pinned to `today`.
pub fn setup_tracker(today: NaiveDate) -> (Tally, Arc<JsonBlobStorage>) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config = Config {
        data_dir: Some(base.join("data")),
        ..Config::default()
    };
    let storage = Arc::new(
        JsonBlobStorage::new(config.resolve_data_dir()).expect("create json storage backend"),
    );
    let store: Arc<dyn BlobStore> = storage.clone();
    let tally = Tally::with_store(config, store, Arc::new(FixedClock::on(today)));
    (tally, storage)
}
