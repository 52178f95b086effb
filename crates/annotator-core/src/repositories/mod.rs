//! Boundary between the client core and the REST backend.
//!
//! Use cases only see the traits below. The HTTP implementations map backend
//! JSON into entities (see `dto`) and reject malformed payloads there.

pub mod api_client;
pub mod dataset_repository;
pub mod dto;
pub mod metrics_repository;
pub mod record_repository;
pub mod vector_repository;
pub mod workspace_repository;

pub use api_client::ApiClient;
pub use dataset_repository::HttpDatasetRepository;
pub use metrics_repository::HttpMetricsRepository;
pub use record_repository::HttpRecordRepository;
pub use vector_repository::HttpVectorRepository;
pub use workspace_repository::HttpWorkspaceRepository;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::models::{
    Dataset, Datasets, MetadataMetrics, Metrics, Record, RecordAnswer, RecordStatus, Records,
    TeamProgress, Vector, VectorKey, Workspaces,
};

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    async fn get_datasets(&self) -> Result<Datasets, RepositoryError>;
    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset, RepositoryError>;
    async fn update_guidelines(
        &self,
        dataset_id: &str,
        guidelines: &str,
    ) -> Result<Dataset, RepositoryError>;
    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn get_workspaces(&self) -> Result<Workspaces, RepositoryError>;
}

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    async fn get_user_metrics(&self, dataset_id: &str) -> Result<Metrics, RepositoryError>;
    async fn get_team_progress(&self, dataset_id: &str) -> Result<TeamProgress, RepositoryError>;
    async fn get_metadata_metrics(
        &self,
        property_id: &str,
    ) -> Result<MetadataMetrics, RepositoryError>;
}

/// Paging and filtering of the records to annotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordQuery {
    pub offset: u32,
    pub limit: u32,
    /// Only records whose response has this status (Pending = no response)
    pub status: Option<RecordStatus>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: crate::constants::DEFAULT_RECORDS_PAGE_SIZE,
            status: Some(RecordStatus::Pending),
        }
    }
}

#[async_trait]
pub trait RecordRepository: Send + Sync {
    async fn get_records(
        &self,
        dataset_id: &str,
        query: RecordQuery,
    ) -> Result<Records, RepositoryError>;

    /// Store the record's local answers with status `submitted`.
    async fn submit_response(&self, record: &Record) -> Result<RecordAnswer, RepositoryError>;

    /// Store the record's local answers with status `draft`.
    async fn save_draft(&self, record: &Record) -> Result<RecordAnswer, RepositoryError>;

    /// Store the record's local answers with status `discarded`.
    async fn discard_response(&self, record: &Record) -> Result<RecordAnswer, RepositoryError>;

    async fn delete_record_response(&self, answer: &RecordAnswer) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait VectorRepository: Send + Sync {
    async fn get_vector(&self, key: &VectorKey) -> Result<Vector, RepositoryError>;
}

/// The adapters of one session.
#[derive(Clone)]
pub struct Repositories {
    pub datasets: Arc<dyn DatasetRepository>,
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub metrics: Arc<dyn MetricsRepository>,
    pub records: Arc<dyn RecordRepository>,
    pub vectors: Arc<dyn VectorRepository>,
}

impl Repositories {
    /// HTTP adapters sharing one client.
    pub fn http(client: ApiClient) -> Self {
        Self {
            datasets: Arc::new(HttpDatasetRepository::new(client.clone())),
            workspaces: Arc::new(HttpWorkspaceRepository::new(client.clone())),
            metrics: Arc::new(HttpMetricsRepository::new(client.clone())),
            records: Arc::new(HttpRecordRepository::new(client.clone())),
            vectors: Arc::new(HttpVectorRepository::new(client)),
        }
    }
}
