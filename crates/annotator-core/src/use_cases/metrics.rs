use std::sync::Arc;
use tracing::debug;

use crate::constants::cache_keys;
use crate::error::CoreError;
use crate::models::{MetadataMetrics, Metrics, TeamProgress};
use crate::repositories::MetricsRepository;
use crate::store::{KeyedStore, Store};

/// Current user's metrics on a dataset. Ticketed: a slow response never
/// overwrites the result of a refresh started after it.
pub struct GetUserMetricsUseCase {
    repository: Arc<dyn MetricsRepository>,
    metrics: Arc<Store<Metrics>>,
}

impl GetUserMetricsUseCase {
    pub fn new(repository: Arc<dyn MetricsRepository>, metrics: Arc<Store<Metrics>>) -> Self {
        Self {
            repository,
            metrics,
        }
    }

    pub async fn execute(&self, dataset_id: &str) -> Result<Metrics, CoreError> {
        let ticket = self.metrics.ticket();
        let metrics = self.repository.get_user_metrics(dataset_id).await?;
        debug!(
            dataset_id,
            records = metrics.records,
            responded = metrics.responded(),
            "user metrics loaded"
        );
        self.metrics.save_latest(ticket, metrics.clone());
        Ok(metrics)
    }
}

pub struct GetTeamProgressUseCase {
    repository: Arc<dyn MetricsRepository>,
    team_progress: Arc<Store<TeamProgress>>,
}

impl GetTeamProgressUseCase {
    pub fn new(
        repository: Arc<dyn MetricsRepository>,
        team_progress: Arc<Store<TeamProgress>>,
    ) -> Self {
        Self {
            repository,
            team_progress,
        }
    }

    pub async fn execute(&self, dataset_id: &str) -> Result<TeamProgress, CoreError> {
        let ticket = self.team_progress.ticket();
        let progress = self.repository.get_team_progress(dataset_id).await?;
        self.team_progress.save_latest(ticket, progress.clone());
        Ok(progress)
    }
}

/// Value distribution of a metadata property, cached per property.
pub struct GetMetadataMetricsUseCase {
    repository: Arc<dyn MetricsRepository>,
    cache: Arc<KeyedStore>,
}

impl GetMetadataMetricsUseCase {
    pub fn new(repository: Arc<dyn MetricsRepository>, cache: Arc<KeyedStore>) -> Self {
        Self { repository, cache }
    }

    pub async fn execute(&self, property_id: &str) -> Result<MetadataMetrics, CoreError> {
        let metrics = self.repository.get_metadata_metrics(property_id).await?;
        self.cache
            .set(cache_keys::metadata_metrics(property_id), metrics.clone());
        Ok(metrics)
    }

    /// Last fetched value, without a request.
    pub fn cached(&self, property_id: &str) -> Option<MetadataMetrics> {
        self.cache.get(&cache_keys::metadata_metrics(property_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStores;
    use crate::use_cases::fakes::FakeBackend;
    use crate::models::TermCount;
    use std::time::Duration;

    fn metrics(dataset_id: &str, records: u64, submitted: u64) -> Metrics {
        Metrics {
            dataset_id: dataset_id.into(),
            records,
            responses: submitted,
            submitted,
            ..Metrics::default()
        }
    }

    #[tokio::test]
    async fn test_user_metrics_saved() {
        let backend = FakeBackend::new();
        backend
            .metrics
            .lock()
            .insert("ds-1".into(), metrics("ds-1", 50, 20));
        let stores = EntityStores::new();

        GetUserMetricsUseCase::new(backend.clone(), stores.metrics.clone())
            .execute("ds-1")
            .await
            .unwrap();
        let state = stores.metrics.state();
        assert_eq!(state.records, 50);
        assert_eq!(state.submitted, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_metrics_response_discarded() {
        let backend = FakeBackend::new();
        backend
            .metrics
            .lock()
            .insert("ds-1".into(), metrics("ds-1", 10, 1));
        backend
            .metrics_delays
            .lock()
            .extend([Duration::from_millis(500), Duration::from_millis(10)]);
        let stores = EntityStores::new();
        let use_case = Arc::new(GetUserMetricsUseCase::new(
            backend.clone(),
            stores.metrics.clone(),
        ));

        // The first (slow) request is started before the second one
        let slow = {
            let use_case = use_case.clone();
            tokio::spawn(async move { use_case.execute("ds-1").await })
        };
        tokio::task::yield_now().await;

        backend
            .metrics
            .lock()
            .insert("ds-1".into(), metrics("ds-1", 10, 2));
        use_case.execute("ds-1").await.unwrap();
        assert_eq!(stores.metrics.state().submitted, 2);

        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale.submitted, 1);
        assert_eq!(stores.metrics.state().submitted, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_lands_when_newer_request_fails() {
        let backend = FakeBackend::new();
        backend
            .metrics
            .lock()
            .insert("ds-1".into(), metrics("ds-1", 10, 1));
        backend
            .metrics_delays
            .lock()
            .push_back(Duration::from_millis(500));
        let stores = EntityStores::new();
        let use_case = Arc::new(GetUserMetricsUseCase::new(
            backend.clone(),
            stores.metrics.clone(),
        ));

        let slow = {
            let use_case = use_case.clone();
            tokio::spawn(async move { use_case.execute("ds-1").await })
        };
        tokio::task::yield_now().await;

        backend.fail(500);
        assert!(use_case.execute("ds-1").await.is_err());

        let loaded = slow.await.unwrap().unwrap();
        assert_eq!(loaded.records, 10);
        assert_eq!(stores.metrics.state().records, 10);
    }

    #[tokio::test]
    async fn test_team_progress() {
        let backend = FakeBackend::new();
        backend.progress.lock().insert(
            "ds-1".into(),
            TeamProgress {
                dataset_id: "ds-1".into(),
                total: 8,
                completed: 2,
                pending: 6,
            },
        );
        let stores = EntityStores::new();
        let use_case = GetTeamProgressUseCase::new(backend.clone(), stores.team_progress.clone());

        use_case.execute("ds-1").await.unwrap();
        assert_eq!(stores.team_progress.state().completed_fraction(), 0.25);

        backend.fail(503);
        assert!(use_case.execute("ds-1").await.is_err());
        assert_eq!(stores.team_progress.state().total, 8);
    }

    #[tokio::test]
    async fn test_metadata_metrics_cached_by_property() {
        let backend = FakeBackend::new();
        backend.metadata.lock().insert(
            "prop-1".into(),
            MetadataMetrics::Terms {
                total: 3,
                values: vec![TermCount {
                    term: "en".into(),
                    count: 3,
                }],
            },
        );
        let stores = EntityStores::new();
        let use_case = GetMetadataMetricsUseCase::new(backend.clone(), stores.keyed.clone());

        assert!(use_case.cached("prop-1").is_none());
        use_case.execute("prop-1").await.unwrap();
        assert!(use_case.cached("prop-1").unwrap().is_terms());
        assert!(stores.keyed.contains("metadata-metrics/prop-1"));
    }
}
