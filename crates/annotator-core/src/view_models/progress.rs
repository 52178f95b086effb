use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::LoadingFlag;
use crate::error::CoreError;
use crate::events::{EventBus, Subscription};
use crate::handlers;
use crate::models::{Metrics, Progress, TeamProgress};
use crate::scheduler::TaskGroup;
use crate::store::Store;
use crate::use_cases::{GetTeamProgressUseCase, GetUserMetricsUseCase};

/// Handlers and in-flight refreshes of one mounted dataset. Dropping it
/// unregisters the handlers and aborts the refreshes.
struct MountedProgress {
    dataset_id: String,
    _subscriptions: Vec<Subscription>,
    tasks: TaskGroup,
}

impl Drop for MountedProgress {
    fn drop(&mut self) {
        self.tasks.abort_all();
        debug!(dataset_id = %self.dataset_id, "annotation progress unmounted");
    }
}

/// Progress panel of the annotation page. Refreshes itself whenever a
/// record of the mounted dataset is answered or cleared; failures of those
/// refreshes are ignored.
pub struct AnnotationProgressViewModel {
    bus: EventBus,
    user_metrics: Arc<GetUserMetricsUseCase>,
    team_progress: Arc<GetTeamProgressUseCase>,
    metrics_store: Arc<Store<Metrics>>,
    team_progress_store: Arc<Store<TeamProgress>>,
    mounted: Mutex<Option<MountedProgress>>,
    loading: LoadingFlag,
}

impl AnnotationProgressViewModel {
    pub fn new(
        bus: EventBus,
        user_metrics: Arc<GetUserMetricsUseCase>,
        team_progress: Arc<GetTeamProgressUseCase>,
        metrics_store: Arc<Store<Metrics>>,
        team_progress_store: Arc<Store<TeamProgress>>,
    ) -> Self {
        Self {
            bus,
            user_metrics,
            team_progress,
            metrics_store,
            team_progress_store,
            mounted: Mutex::new(None),
            loading: LoadingFlag::default(),
        }
    }

    /// Start following `dataset_id` (replacing any previous dataset) and
    /// load its metrics.
    pub async fn mount(&self, dataset_id: &str) -> Result<(), CoreError> {
        if dataset_id.is_empty() {
            return Err(CoreError::guard("cannot mount progress without a dataset"));
        }
        let tasks = TaskGroup::new();
        let subscriptions = handlers::progress_refresh(
            &self.bus,
            dataset_id,
            self.user_metrics.clone(),
            self.team_progress.clone(),
            &tasks,
        );
        // Replacing drops the previous mount
        *self.mounted.lock() = Some(MountedProgress {
            dataset_id: dataset_id.to_string(),
            _subscriptions: subscriptions,
            tasks,
        });
        debug!(dataset_id, "annotation progress mounted");

        let _loading = self.loading.start();
        let (metrics, progress) = futures::join!(
            self.user_metrics.execute(dataset_id),
            self.team_progress.execute(dataset_id)
        );
        if let Err(e) = metrics {
            debug!(dataset_id, "metrics load failed: {}", e);
        }
        if let Err(e) = progress {
            debug!(dataset_id, "team progress load failed: {}", e);
        }
        Ok(())
    }

    pub fn unmount(&self) {
        self.mounted.lock().take();
    }

    pub fn mounted_dataset(&self) -> Option<String> {
        self.mounted.lock().as_ref().map(|m| m.dataset_id.clone())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.lock().is_some()
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics_store.state()
    }

    pub fn team_progress(&self) -> TeamProgress {
        self.team_progress_store.state()
    }

    /// The user's own progress on the mounted dataset.
    pub fn progress(&self) -> Progress {
        self.metrics_store.with(|m| m.as_progress())
    }

    pub fn subscribe(&self) -> watch::Receiver<Metrics> {
        self.metrics_store.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// Refreshes spawned by event handlers and still running.
    pub fn refreshes_in_flight(&self) -> usize {
        self.mounted
            .lock()
            .as_ref()
            .map(|m| m.tasks.in_flight())
            .unwrap_or(0)
    }
}
