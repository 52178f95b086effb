use std::sync::Arc;
use tracing::info;

use crate::error::CoreError;
use crate::events::{DomainEvent, EventBus};
use crate::models::DatasetSetting;
use crate::repositories::DatasetRepository;
use crate::store::Store;

pub struct GetDatasetSettingUseCase {
    repository: Arc<dyn DatasetRepository>,
    dataset_setting: Arc<Store<DatasetSetting>>,
}

impl GetDatasetSettingUseCase {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        dataset_setting: Arc<Store<DatasetSetting>>,
    ) -> Self {
        Self {
            repository,
            dataset_setting,
        }
    }

    pub async fn execute(&self, dataset_id: &str) -> Result<DatasetSetting, CoreError> {
        let dataset = self.repository.get_dataset(dataset_id).await?;
        let setting = DatasetSetting::from_dataset(dataset);
        self.dataset_setting.save(setting.clone());
        Ok(setting)
    }
}

/// Persists the edited guidelines of `setting` and commits them locally.
pub struct UpdateGuidelinesSettingUseCase {
    repository: Arc<dyn DatasetRepository>,
    dataset_setting: Arc<Store<DatasetSetting>>,
    bus: EventBus,
}

impl UpdateGuidelinesSettingUseCase {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        dataset_setting: Arc<Store<DatasetSetting>>,
        bus: EventBus,
    ) -> Self {
        Self {
            repository,
            dataset_setting,
            bus,
        }
    }

    pub async fn execute(&self, setting: &mut DatasetSetting) -> Result<(), CoreError> {
        if setting.is_empty() {
            return Err(CoreError::guard("guidelines edited before the dataset was loaded"));
        }
        let dataset = self
            .repository
            .update_guidelines(setting.dataset_id(), setting.guidelines.value())
            .await?;
        info!(dataset_id = %dataset.id, "guidelines updated");

        setting.dataset = dataset;
        setting.commit();
        self.dataset_setting.save(setting.clone());

        self.bus.publish(&DomainEvent::DatasetSettingUpdated {
            dataset_id: setting.dataset_id().to_string(),
        });
        Ok(())
    }
}
