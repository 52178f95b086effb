use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::events::{DomainEvent, EventBus};
use crate::models::{Dataset, Datasets, Workspaces};
use crate::repositories::{DatasetRepository, WorkspaceRepository};
use crate::store::{EntityStores, Store};

pub struct GetDatasetsUseCase {
    repository: Arc<dyn DatasetRepository>,
    datasets: Arc<Store<Datasets>>,
}

impl GetDatasetsUseCase {
    pub fn new(repository: Arc<dyn DatasetRepository>, datasets: Arc<Store<Datasets>>) -> Self {
        Self {
            repository,
            datasets,
        }
    }

    pub async fn execute(&self) -> Result<Datasets, CoreError> {
        let datasets = self.repository.get_datasets().await?;
        debug!(count = datasets.len(), "datasets loaded");
        self.datasets.save(datasets.clone());
        Ok(datasets)
    }
}

pub struct GetWorkspacesUseCase {
    repository: Arc<dyn WorkspaceRepository>,
    workspaces: Arc<Store<Workspaces>>,
}

impl GetWorkspacesUseCase {
    pub fn new(
        repository: Arc<dyn WorkspaceRepository>,
        workspaces: Arc<Store<Workspaces>>,
    ) -> Self {
        Self {
            repository,
            workspaces,
        }
    }

    pub async fn execute(&self) -> Result<Workspaces, CoreError> {
        let workspaces = self.repository.get_workspaces().await?;
        self.workspaces.save(workspaces.clone());
        Ok(workspaces)
    }
}

/// Loads the dataset being worked on. When several loads overlap only the
/// most recently started one lands in the slot.
pub struct GetDatasetByIdUseCase {
    repository: Arc<dyn DatasetRepository>,
    dataset: Arc<Store<Dataset>>,
}

impl GetDatasetByIdUseCase {
    pub fn new(repository: Arc<dyn DatasetRepository>, dataset: Arc<Store<Dataset>>) -> Self {
        Self {
            repository,
            dataset,
        }
    }

    pub async fn execute(&self, dataset_id: &str) -> Result<Dataset, CoreError> {
        let ticket = self.dataset.ticket();
        let dataset = self.repository.get_dataset(dataset_id).await?;
        self.dataset.save_latest(ticket, dataset.clone());
        Ok(dataset)
    }
}

pub struct DeleteDatasetUseCase {
    repository: Arc<dyn DatasetRepository>,
    stores: EntityStores,
    bus: EventBus,
}

impl DeleteDatasetUseCase {
    pub fn new(repository: Arc<dyn DatasetRepository>, stores: EntityStores, bus: EventBus) -> Self {
        Self {
            repository,
            stores,
            bus,
        }
    }

    pub async fn execute(&self, dataset_id: &str) -> Result<(), CoreError> {
        if dataset_id.is_empty() {
            return Err(CoreError::guard("cannot delete a dataset without id"));
        }
        self.repository.delete_dataset(dataset_id).await?;
        info!(dataset_id, "dataset deleted");

        let remaining = self.stores.datasets.with(|d| d.without(dataset_id));
        self.stores.datasets.save(remaining);
        if self.stores.dataset.with(|d| d.id == dataset_id) {
            self.stores.dataset.clear();
        }
        if self.stores.dataset_setting.with(|s| s.dataset_id() == dataset_id) {
            self.stores.dataset_setting.clear();
        }

        self.bus.publish(&DomainEvent::DatasetDeleted {
            dataset_id: dataset_id.to_string(),
        });
        Ok(())
    }
}
