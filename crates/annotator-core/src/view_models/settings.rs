use parking_lot::Mutex;

use super::{notify_failure, LoadingFlag};
use crate::error::CoreError;
use crate::models::DatasetSetting;
use crate::notifications::{Notification, SharedNotifications};
use crate::use_cases::{GetDatasetSettingUseCase, UpdateGuidelinesSettingUseCase};

/// Dataset settings page. Edits stay local until `save` succeeds.
pub struct DatasetSettingsViewModel {
    get_setting: GetDatasetSettingUseCase,
    update_guidelines: UpdateGuidelinesSettingUseCase,
    setting: Mutex<DatasetSetting>,
    notifications: SharedNotifications,
    loading: LoadingFlag,
}

impl DatasetSettingsViewModel {
    pub fn new(
        get_setting: GetDatasetSettingUseCase,
        update_guidelines: UpdateGuidelinesSettingUseCase,
        notifications: SharedNotifications,
    ) -> Self {
        Self {
            get_setting,
            update_guidelines,
            setting: Mutex::new(DatasetSetting::default()),
            notifications,
            loading: LoadingFlag::default(),
        }
    }

    pub async fn load(&self, dataset_id: &str) -> Result<(), CoreError> {
        let _loading = self.loading.start();
        match self.get_setting.execute(dataset_id).await {
            Ok(setting) => {
                *self.setting.lock() = setting;
                Ok(())
            }
            Err(e) => {
                notify_failure(&self.notifications, "Could not load the dataset settings", &e);
                Err(e)
            }
        }
    }

    pub fn setting(&self) -> DatasetSetting {
        self.setting.lock().clone()
    }

    pub fn guidelines(&self) -> String {
        self.setting.lock().guidelines.value().clone()
    }

    pub fn edit_guidelines(&self, guidelines: impl Into<String>) {
        self.setting.lock().guidelines.update(guidelines.into());
    }

    pub fn is_modified(&self) -> bool {
        self.setting.lock().is_modified()
    }

    pub fn restore(&self) {
        self.setting.lock().restore();
    }

    pub async fn save(&self) -> Result<(), CoreError> {
        let Some(_loading) = self.loading.start() else {
            return Err(CoreError::guard("settings saved while loading"));
        };
        let mut working = self.setting();
        match self.update_guidelines.execute(&mut working).await {
            Ok(()) => {
                // Keep edits made while the request was in flight
                let mut setting = self.setting.lock();
                let edited = setting.guidelines.value().clone();
                *setting = working;
                setting.guidelines.update(edited);
                drop(setting);
                self.notifications
                    .lock()
                    .notify(Notification::success("Guidelines saved"));
                Ok(())
            }
            Err(e) => {
                notify_failure(&self.notifications, "Could not save the guidelines", &e);
                Err(e)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }
}
