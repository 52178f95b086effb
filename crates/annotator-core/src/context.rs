//! Everything one signed-in session shares.
//!
//! The context owns the slots, the bus, the repositories, the preferences and
//! the notification queue, and builds use cases and view models wired to
//! them. Dropping it releases every slot and subscription.

use std::sync::Arc;
use tracing::info;

use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::events::{EventBus, Subscription};
use crate::handlers;
use crate::models::Record;
use crate::notifications::{NotificationManager, SharedNotifications};
use crate::preferences::Preferences;
use crate::repositories::{ApiClient, Repositories};
use crate::scheduler::TaskGroup;
use crate::store::EntityStores;
use crate::use_cases::{
    ClearRecordUseCase, DeleteDatasetUseCase, DiscardRecordUseCase, GetDatasetByIdUseCase,
    GetDatasetSettingUseCase, GetDatasetsUseCase, GetMetadataMetricsUseCase,
    GetRecordVectorUseCase, GetTeamProgressUseCase, GetUserMetricsUseCase, GetWorkspacesUseCase,
    LoadRecordsUseCase, SaveDraftRecordUseCase, SubmitRecordUseCase,
    UpdateGuidelinesSettingUseCase,
};
use crate::view_models::{
    AnnotationProgressViewModel, DatasetSettingsViewModel, DatasetsViewModel, LayoutViewModel,
    RecordViewModel,
};

pub struct SessionContext {
    config: CoreConfig,
    stores: EntityStores,
    bus: EventBus,
    repositories: Repositories,
    preferences: Arc<Preferences>,
    notifications: SharedNotifications,
    tasks: TaskGroup,
    _handlers: Vec<Subscription>,
}

impl SessionContext {
    pub fn new(config: CoreConfig, repositories: Repositories) -> Self {
        let stores = EntityStores::new();
        let bus = EventBus::new();
        let tasks = TaskGroup::new();
        let preferences = Arc::new(Preferences::open(config.preferences_path()));

        let get_dataset = Arc::new(GetDatasetByIdUseCase::new(
            repositories.datasets.clone(),
            stores.dataset.clone(),
        ));
        let handlers = handlers::session_handlers(&bus, &stores, get_dataset, &tasks);

        info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "session started");
        Self {
            config,
            stores,
            bus,
            repositories,
            preferences,
            notifications: NotificationManager::shared(),
            tasks,
            _handlers: handlers,
        }
    }

    /// Session over the HTTP repositories.
    pub fn connect(config: CoreConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(&config)?;
        Ok(Self::new(config, Repositories::http(client)))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn stores(&self) -> &EntityStores {
        &self.stores
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    pub fn preferences(&self) -> &Arc<Preferences> {
        &self.preferences
    }

    pub fn notifications(&self) -> &SharedNotifications {
        &self.notifications
    }

    // Use cases

    pub fn get_datasets(&self) -> GetDatasetsUseCase {
        GetDatasetsUseCase::new(self.repositories.datasets.clone(), self.stores.datasets.clone())
    }

    pub fn get_workspaces(&self) -> GetWorkspacesUseCase {
        GetWorkspacesUseCase::new(
            self.repositories.workspaces.clone(),
            self.stores.workspaces.clone(),
        )
    }

    pub fn get_dataset_by_id(&self) -> GetDatasetByIdUseCase {
        GetDatasetByIdUseCase::new(self.repositories.datasets.clone(), self.stores.dataset.clone())
    }

    pub fn delete_dataset(&self) -> DeleteDatasetUseCase {
        DeleteDatasetUseCase::new(
            self.repositories.datasets.clone(),
            self.stores.clone(),
            self.bus.clone(),
        )
    }

    pub fn get_user_metrics(&self) -> GetUserMetricsUseCase {
        GetUserMetricsUseCase::new(self.repositories.metrics.clone(), self.stores.metrics.clone())
    }

    pub fn get_team_progress(&self) -> GetTeamProgressUseCase {
        GetTeamProgressUseCase::new(
            self.repositories.metrics.clone(),
            self.stores.team_progress.clone(),
        )
    }

    pub fn get_metadata_metrics(&self) -> GetMetadataMetricsUseCase {
        GetMetadataMetricsUseCase::new(self.repositories.metrics.clone(), self.stores.keyed.clone())
    }

    pub fn get_dataset_setting(&self) -> GetDatasetSettingUseCase {
        GetDatasetSettingUseCase::new(
            self.repositories.datasets.clone(),
            self.stores.dataset_setting.clone(),
        )
    }

    pub fn update_guidelines_setting(&self) -> UpdateGuidelinesSettingUseCase {
        UpdateGuidelinesSettingUseCase::new(
            self.repositories.datasets.clone(),
            self.stores.dataset_setting.clone(),
            self.bus.clone(),
        )
    }

    pub fn load_records(&self) -> LoadRecordsUseCase {
        LoadRecordsUseCase::new(self.repositories.records.clone(), self.stores.records.clone())
    }

    pub fn submit_record(&self) -> SubmitRecordUseCase {
        SubmitRecordUseCase::new(self.repositories.records.clone(), self.bus.clone())
    }

    pub fn save_draft_record(&self) -> SaveDraftRecordUseCase {
        SaveDraftRecordUseCase::new(self.repositories.records.clone(), self.bus.clone())
    }

    pub fn discard_record(&self) -> DiscardRecordUseCase {
        DiscardRecordUseCase::new(self.repositories.records.clone(), self.bus.clone())
    }

    pub fn clear_record(&self) -> ClearRecordUseCase {
        ClearRecordUseCase::new(self.repositories.records.clone(), self.bus.clone())
    }

    pub fn get_record_vector(&self) -> GetRecordVectorUseCase {
        GetRecordVectorUseCase::new(self.repositories.vectors.clone(), self.stores.keyed.clone())
    }

    // View models

    pub fn datasets_view_model(&self) -> DatasetsViewModel {
        DatasetsViewModel::new(
            self.get_datasets(),
            self.get_workspaces(),
            self.delete_dataset(),
            self.stores.datasets.clone(),
            self.stores.workspaces.clone(),
            self.notifications.clone(),
        )
    }

    pub fn progress_view_model(&self) -> AnnotationProgressViewModel {
        AnnotationProgressViewModel::new(
            self.bus.clone(),
            Arc::new(self.get_user_metrics()),
            Arc::new(self.get_team_progress()),
            self.stores.metrics.clone(),
            self.stores.team_progress.clone(),
        )
    }

    pub fn record_view_model(&self, record: Record) -> RecordViewModel {
        RecordViewModel::new(
            record,
            self.submit_record(),
            self.save_draft_record(),
            self.discard_record(),
            self.clear_record(),
            self.notifications.clone(),
        )
    }

    pub fn settings_view_model(&self) -> DatasetSettingsViewModel {
        DatasetSettingsViewModel::new(
            self.get_dataset_setting(),
            self.update_guidelines_setting(),
            self.notifications.clone(),
        )
    }

    pub fn layout_view_model(&self) -> LayoutViewModel {
        LayoutViewModel::new(self.preferences.clone(), self.config.debounce())
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DomainEvent, EventKind};
    use crate::models::Metrics;
    use crate::use_cases::fakes::{dataset, FakeBackend};
    use tempfile::TempDir;

    fn session(backend: &Arc<FakeBackend>, dir: &TempDir) -> SessionContext {
        let config = CoreConfig::new("http://localhost:6900", dir.path());
        SessionContext::new(config, backend.repositories())
    }

    #[tokio::test]
    async fn test_session_handlers_registered() {
        let backend = FakeBackend::new();
        let dir = TempDir::new().unwrap();
        let ctx = session(&backend, &dir);
        assert_eq!(ctx.bus().handler_count(EventKind::DatasetDeleted), 1);
        assert_eq!(ctx.bus().handler_count(EventKind::DatasetSettingUpdated), 1);

        let bus = ctx.bus().clone();
        drop(ctx);
        assert_eq!(bus.handler_count(EventKind::DatasetDeleted), 0);
    }

    #[tokio::test]
    async fn test_delete_through_view_model_drops_dataset_state() {
        let backend = FakeBackend::new();
        backend.datasets.lock().push(dataset("ds-1", "reviews"));
        backend.metrics.lock().insert(
            "ds-1".into(),
            Metrics {
                dataset_id: "ds-1".into(),
                records: 3,
                ..Metrics::default()
            },
        );
        let dir = TempDir::new().unwrap();
        let ctx = session(&backend, &dir);

        let datasets = ctx.datasets_view_model();
        datasets.load().await.unwrap();
        ctx.get_user_metrics().execute("ds-1").await.unwrap();
        assert_eq!(ctx.stores().metrics.state().records, 3);

        datasets.delete("ds-1").await.unwrap();
        assert!(datasets.datasets().is_empty());
        assert_eq!(ctx.stores().metrics.state(), Metrics::default());
    }

    #[tokio::test]
    async fn test_layout_persists_into_session_preferences() {
        let backend = FakeBackend::new();
        let dir = TempDir::new().unwrap();
        let ctx = session(&backend, &dir);

        let layout = ctx.layout_view_model();
        layout.set_position("sidebar", 0.3).unwrap();
        layout.flush();
        assert_eq!(ctx.preferences().get::<f64>("layout.sidebar"), Some(0.3));

        let reopened = Preferences::open(dir.path().join("preferences.json"));
        assert_eq!(reopened.get::<f64>("layout.sidebar"), Some(0.3));
    }

    #[tokio::test]
    async fn test_record_answer_refreshes_mounted_progress() {
        let backend = FakeBackend::new();
        backend.metrics.lock().insert(
            "ds-1".into(),
            Metrics {
                dataset_id: "ds-1".into(),
                records: 5,
                ..Metrics::default()
            },
        );
        backend.progress.lock().insert("ds-1".into(), Default::default());
        let dir = TempDir::new().unwrap();
        let ctx = session(&backend, &dir);
        let progress = ctx.progress_view_model();
        progress.mount("ds-1").await.unwrap();
        let before = backend.calls_to("get_user_metrics");

        ctx.bus().publish(&DomainEvent::RecordResponseUpdated {
            dataset_id: "ds-1".into(),
            record_id: "rec-1".into(),
        });
        while progress.refreshes_in_flight() > 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(backend.calls_to("get_user_metrics"), before + 1);
    }
}
