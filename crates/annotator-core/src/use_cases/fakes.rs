//! In-memory repositories for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::error::RepositoryError;
use crate::models::{
    Dataset, Datasets, MetadataMetrics, Metrics, Record, RecordAnswer, RecordStatus, Records,
    TeamProgress, Vector, VectorKey, Workspace, Workspaces,
};
use crate::repositories::{
    DatasetRepository, MetricsRepository, RecordQuery, RecordRepository, Repositories,
    VectorRepository, WorkspaceRepository,
};

#[derive(Default)]
pub struct FakeBackend {
    pub datasets: Mutex<Vec<Dataset>>,
    pub workspaces: Mutex<Vec<Workspace>>,
    pub metrics: Mutex<HashMap<String, Metrics>>,
    pub progress: Mutex<HashMap<String, TeamProgress>>,
    pub metadata: Mutex<HashMap<String, MetadataMetrics>>,
    pub records: Mutex<Vec<Record>>,
    pub vectors: Mutex<HashMap<VectorKey, Vec<f32>>>,
    /// Delays applied to successive metrics calls (first call pops first)
    pub metrics_delays: Mutex<VecDeque<Duration>>,
    /// Delay applied to every guidelines update
    pub update_delay: Mutex<Option<Duration>>,
    /// Ids of the answers passed to `delete_record_response`, in call order
    pub deleted_answers: Mutex<Vec<String>>,
    /// Every call fails with this status while set
    pub fail_with: Mutex<Option<u16>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            datasets: self.clone(),
            workspaces: self.clone(),
            metrics: self.clone(),
            records: self.clone(),
            vectors: self.clone(),
        }
    }

    pub fn fail(&self, status: u16) {
        *self.fail_with.lock() = Some(status);
    }

    pub fn recover(&self) {
        *self.fail_with.lock() = None;
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == name).count()
    }

    fn call(&self, name: &str) -> Result<(), RepositoryError> {
        self.calls.lock().push(name.to_string());
        match *self.fail_with.lock() {
            Some(status) => Err(RepositoryError::Backend {
                status,
                response: "fake_failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn not_found() -> RepositoryError {
        RepositoryError::Backend {
            status: 404,
            response: "not_found".to_string(),
        }
    }

    fn answer(record: &Record, status: RecordStatus) -> RecordAnswer {
        RecordAnswer {
            id: record
                .answer
                .as_ref()
                .map(|a| a.id.clone())
                .unwrap_or_else(|| format!("resp-{}", record.id)),
            status,
            values: record.response_values(),
            updated_at: None,
        }
    }
}

pub fn dataset(id: &str, name: &str) -> Dataset {
    Dataset {
        id: id.to_string(),
        name: name.to_string(),
        workspace_id: "ws-1".to_string(),
        ..Dataset::default()
    }
}

#[async_trait]
impl DatasetRepository for FakeBackend {
    async fn get_datasets(&self) -> Result<Datasets, RepositoryError> {
        self.call("get_datasets")?;
        Ok(Datasets::new(self.datasets.lock().clone()))
    }

    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset, RepositoryError> {
        self.call("get_dataset")?;
        self.datasets
            .lock()
            .iter()
            .find(|d| d.id == dataset_id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn update_guidelines(
        &self,
        dataset_id: &str,
        guidelines: &str,
    ) -> Result<Dataset, RepositoryError> {
        self.call("update_guidelines")?;
        let delay = *self.update_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut datasets = self.datasets.lock();
        let dataset = datasets
            .iter_mut()
            .find(|d| d.id == dataset_id)
            .ok_or_else(Self::not_found)?;
        dataset.guidelines = Some(guidelines.to_string());
        Ok(dataset.clone())
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), RepositoryError> {
        self.call("delete_dataset")?;
        self.datasets.lock().retain(|d| d.id != dataset_id);
        Ok(())
    }
}

#[async_trait]
impl WorkspaceRepository for FakeBackend {
    async fn get_workspaces(&self) -> Result<Workspaces, RepositoryError> {
        self.call("get_workspaces")?;
        Ok(Workspaces::new(self.workspaces.lock().clone()))
    }
}

#[async_trait]
impl MetricsRepository for FakeBackend {
    async fn get_user_metrics(&self, dataset_id: &str) -> Result<Metrics, RepositoryError> {
        self.call("get_user_metrics")?;
        let delay = self.metrics_delays.lock().pop_front();
        let metrics = self.metrics.lock().get(dataset_id).cloned();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        metrics.ok_or_else(Self::not_found)
    }

    async fn get_team_progress(&self, dataset_id: &str) -> Result<TeamProgress, RepositoryError> {
        self.call("get_team_progress")?;
        self.progress
            .lock()
            .get(dataset_id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn get_metadata_metrics(
        &self,
        property_id: &str,
    ) -> Result<MetadataMetrics, RepositoryError> {
        self.call("get_metadata_metrics")?;
        self.metadata
            .lock()
            .get(property_id)
            .cloned()
            .ok_or_else(Self::not_found)
    }
}

#[async_trait]
impl RecordRepository for FakeBackend {
    async fn get_records(
        &self,
        dataset_id: &str,
        query: RecordQuery,
    ) -> Result<Records, RepositoryError> {
        self.call("get_records")?;
        let matching: Vec<Record> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.dataset_id == dataset_id)
            .filter(|r| query.status.map(|s| r.status == s).unwrap_or(true))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(Records { items, total })
    }

    async fn submit_response(&self, record: &Record) -> Result<RecordAnswer, RepositoryError> {
        self.call("submit_response")?;
        Ok(Self::answer(record, RecordStatus::Submitted))
    }

    async fn save_draft(&self, record: &Record) -> Result<RecordAnswer, RepositoryError> {
        self.call("save_draft")?;
        Ok(Self::answer(record, RecordStatus::Draft))
    }

    async fn discard_response(&self, record: &Record) -> Result<RecordAnswer, RepositoryError> {
        self.call("discard_response")?;
        Ok(Self::answer(record, RecordStatus::Discarded))
    }

    async fn delete_record_response(&self, answer: &RecordAnswer) -> Result<(), RepositoryError> {
        self.call("delete_record_response")?;
        self.deleted_answers.lock().push(answer.id.clone());
        Ok(())
    }
}

#[async_trait]
impl VectorRepository for FakeBackend {
    async fn get_vector(&self, key: &VectorKey) -> Result<Vector, RepositoryError> {
        self.call("get_vector")?;
        let values = self
            .vectors
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(Self::not_found)?;
        Ok(Vector {
            key: key.clone(),
            values,
        })
    }
}
