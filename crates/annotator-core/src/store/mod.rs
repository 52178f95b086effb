pub mod keyed;
pub mod slot;

pub use keyed::KeyedStore;
pub use slot::{Store, Ticket};

use std::sync::Arc;
use tracing::debug;

use crate::models::{
    Dataset, DatasetSetting, Datasets, Metrics, Records, TeamProgress, Workspaces,
};

/// Every slot owned by one session.
#[derive(Clone)]
pub struct EntityStores {
    pub dataset: Arc<Store<Dataset>>,
    pub datasets: Arc<Store<Datasets>>,
    pub workspaces: Arc<Store<Workspaces>>,
    pub metrics: Arc<Store<Metrics>>,
    pub team_progress: Arc<Store<TeamProgress>>,
    pub dataset_setting: Arc<Store<DatasetSetting>>,
    pub records: Arc<Store<Records>>,
    pub keyed: Arc<KeyedStore>,
}

impl EntityStores {
    pub fn new() -> Self {
        Self {
            dataset: Arc::new(Store::new("dataset")),
            datasets: Arc::new(Store::new("datasets")),
            workspaces: Arc::new(Store::new("workspaces")),
            metrics: Arc::new(Store::new("metrics")),
            team_progress: Arc::new(Store::new("team_progress")),
            dataset_setting: Arc::new(Store::new("dataset_setting")),
            records: Arc::new(Store::new("records")),
            keyed: Arc::new(KeyedStore::new()),
        }
    }

    /// Reset every slot (e.g. on sign-out).
    pub fn clear(&self) {
        self.dataset.clear();
        self.datasets.clear();
        self.workspaces.clear();
        self.metrics.clear();
        self.team_progress.clear();
        self.dataset_setting.clear();
        self.records.clear();
        self.keyed.clear();
        debug!("all entity stores cleared");
    }
}

impl Default for EntityStores {
    fn default() -> Self {
        Self::new()
    }
}
