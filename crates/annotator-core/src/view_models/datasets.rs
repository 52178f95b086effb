use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::{notify_failure, LoadingFlag};
use crate::error::CoreError;
use crate::models::{Datasets, Workspaces};
use crate::notifications::{Notification, SharedNotifications};
use crate::store::Store;
use crate::use_cases::{DeleteDatasetUseCase, GetDatasetsUseCase, GetWorkspacesUseCase};

/// Home screen: the user's datasets grouped by workspace.
pub struct DatasetsViewModel {
    get_datasets: GetDatasetsUseCase,
    get_workspaces: GetWorkspacesUseCase,
    delete_dataset: DeleteDatasetUseCase,
    datasets: Arc<Store<Datasets>>,
    workspaces: Arc<Store<Workspaces>>,
    notifications: SharedNotifications,
    loading: LoadingFlag,
}

impl DatasetsViewModel {
    pub fn new(
        get_datasets: GetDatasetsUseCase,
        get_workspaces: GetWorkspacesUseCase,
        delete_dataset: DeleteDatasetUseCase,
        datasets: Arc<Store<Datasets>>,
        workspaces: Arc<Store<Workspaces>>,
        notifications: SharedNotifications,
    ) -> Self {
        Self {
            get_datasets,
            get_workspaces,
            delete_dataset,
            datasets,
            workspaces,
            notifications,
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load(&self) -> Result<(), CoreError> {
        let Some(_loading) = self.loading.start() else {
            debug!("datasets already loading");
            return Ok(());
        };
        let result = futures::try_join!(self.get_datasets.execute(), self.get_workspaces.execute());
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                notify_failure(&self.notifications, "Could not load datasets", &e);
                Err(e)
            }
        }
    }

    pub async fn delete(&self, dataset_id: &str) -> Result<(), CoreError> {
        let name = self
            .datasets
            .with(|d| d.find(dataset_id).map(|ds| ds.name.clone()))
            .unwrap_or_else(|| dataset_id.to_string());

        match self.delete_dataset.execute(dataset_id).await {
            Ok(()) => {
                self.notifications
                    .lock()
                    .notify(Notification::success(format!("Dataset '{}' deleted", name)));
                Ok(())
            }
            Err(e) => {
                notify_failure(
                    &self.notifications,
                    &format!("Could not delete dataset '{}'", name),
                    &e,
                );
                Err(e)
            }
        }
    }

    pub fn datasets(&self) -> Datasets {
        self.datasets.state()
    }

    pub fn workspaces(&self) -> Workspaces {
        self.workspaces.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<Datasets> {
        self.datasets.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }
}
