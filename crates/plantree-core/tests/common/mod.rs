use plantree_core::{PlanTreeStore, StoreBuilder};
use tempfile::TempDir;

/// Helper function to create a store backed by a fresh data directory
pub fn create_test_store() -> (TempDir, PlanTreeStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = StoreBuilder::new()
        .with_data_dir(Some(temp_dir.path()))
        .build()
        .expect("Failed to create store");
    (temp_dir, store)
}

/// Reopens the store persisted in `temp_dir`
pub fn reopen_store(temp_dir: &TempDir) -> PlanTreeStore {
    StoreBuilder::new()
        .with_data_dir(Some(temp_dir.path()))
        .build()
        .expect("Failed to reopen store")
}
