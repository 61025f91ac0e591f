use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::models::Reading;

/// Loaded series keyed by station code
pub type StationData = HashMap<String, Vec<Reading>>;

/// What the service can currently do with its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    /// Station spreadsheets are still being fetched
    Loading,
    Ready,
    /// A prediction is running; new requests are turned away
    Predicting,
}

/// Shared, explicitly passed cache of the station series.
///
/// Starts empty; becomes loaded once, after the startup load finishes.
#[derive(Clone, Default)]
pub struct DatasetStore {
    data: Arc<RwLock<Option<Arc<StationData>>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that is already loaded (tests, CLI)
    pub fn with_data(data: StationData) -> Self {
        Self {
            data: Arc::new(RwLock::new(Some(Arc::new(data)))),
        }
    }

    pub async fn set_loaded(&self, data: StationData) {
        *self.data.write().await = Some(Arc::new(data));
    }

    pub async fn is_loaded(&self) -> bool {
        self.data.read().await.is_some()
    }

    /// The loaded data, or `None` while loading
    pub async fn snapshot(&self) -> Option<Arc<StationData>> {
        self.data.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_store_starts_unloaded() {
        let store = DatasetStore::new();
        assert!(!store.is_loaded().await);
        assert!(store.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_set_loaded_is_visible_to_clones() {
        let store = DatasetStore::new();
        let clone = store.clone();

        let mut data = StationData::new();
        data.insert(
            "P42".to_string(),
            vec![Reading::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3.0)],
        );
        store.set_loaded(data).await;

        assert!(clone.is_loaded().await);
        let snapshot = clone.snapshot().await.unwrap();
        assert_eq!(snapshot["P42"].len(), 1);
    }

    #[tokio::test]
    async fn test_with_data_is_loaded() {
        let store = DatasetStore::with_data(StationData::new());
        assert!(store.is_loaded().await);
    }
}
