//! Event handler registrations.
//!
//! Every reaction to a domain event is registered here, explicitly and by
//! event kind. Handlers run synchronously on the publisher's stack, so any
//! backend work is spawned onto the caller's [`TaskGroup`].

use std::sync::Arc;
use tracing::debug;

use crate::events::{DomainEvent, EventBus, EventKind, Subscription};
use crate::scheduler::TaskGroup;
use crate::store::EntityStores;
use crate::use_cases::{GetDatasetByIdUseCase, GetTeamProgressUseCase, GetUserMetricsUseCase};

/// Reload user metrics and team progress of `dataset_id` whenever one of its
/// records gets a new, changed or deleted response. Refresh failures are
/// logged and otherwise ignored.
pub fn progress_refresh(
    bus: &EventBus,
    dataset_id: &str,
    user_metrics: Arc<GetUserMetricsUseCase>,
    team_progress: Arc<GetTeamProgressUseCase>,
    tasks: &TaskGroup,
) -> Vec<Subscription> {
    [EventKind::RecordResponseUpdated, EventKind::RecordCleared]
        .into_iter()
        .map(|kind| {
            let dataset_id = dataset_id.to_string();
            let user_metrics = user_metrics.clone();
            let team_progress = team_progress.clone();
            let tasks = tasks.clone();
            bus.subscribe(kind, move |event| {
                if event.dataset_id() != dataset_id {
                    return Ok(());
                }
                let dataset_id = dataset_id.clone();
                let user_metrics = user_metrics.clone();
                let team_progress = team_progress.clone();
                tasks.spawn(async move {
                    let (metrics, progress) = futures::join!(
                        user_metrics.execute(&dataset_id),
                        team_progress.execute(&dataset_id)
                    );
                    if let Err(e) = metrics {
                        debug!(%dataset_id, "metrics refresh failed: {}", e);
                    }
                    if let Err(e) = progress {
                        debug!(%dataset_id, "team progress refresh failed: {}", e);
                    }
                })
            })
        })
        .collect()
}

/// Session-wide reactions that keep the shared slots consistent.
pub fn session_handlers(
    bus: &EventBus,
    stores: &EntityStores,
    get_dataset: Arc<GetDatasetByIdUseCase>,
    tasks: &TaskGroup,
) -> Vec<Subscription> {
    let mut subscriptions = Vec::with_capacity(2);

    // Drop per-dataset state of a deleted dataset
    let slots = stores.clone();
    subscriptions.push(bus.subscribe(EventKind::DatasetDeleted, move |event| {
        let dataset_id = event.dataset_id();
        // An empty slot may still be waiting for the deleted dataset's first load
        if slots
            .metrics
            .with(|m| m.dataset_id == dataset_id || m.dataset_id.is_empty())
        {
            slots.metrics.invalidate();
            slots.metrics.clear();
        }
        if slots
            .team_progress
            .with(|p| p.dataset_id == dataset_id || p.dataset_id.is_empty())
        {
            slots.team_progress.invalidate();
            slots.team_progress.clear();
        }
        if slots
            .records
            .with(|r| r.first().map(|rec| rec.dataset_id == dataset_id).unwrap_or(false))
        {
            slots.records.clear();
        }
        Ok(())
    }));

    // New guidelines: reload the current dataset if it is the one edited
    let current = stores.dataset.clone();
    let tasks = tasks.clone();
    subscriptions.push(bus.subscribe(EventKind::DatasetSettingUpdated, move |event| {
        let DomainEvent::DatasetSettingUpdated { dataset_id } = event else {
            return Ok(());
        };
        if !current.with(|d| d.id == *dataset_id) {
            return Ok(());
        }
        let dataset_id = dataset_id.clone();
        let get_dataset = get_dataset.clone();
        tasks.spawn(async move {
            if let Err(e) = get_dataset.execute(&dataset_id).await {
                debug!(%dataset_id, "dataset refresh failed: {}", e);
            }
        })
    }));

    subscriptions
}
