use async_trait::async_trait;

use super::api_client::ApiClient;
use super::dto::{DatasetProgressDto, MetadataMetricsDto, UserMetricsDto};
use super::MetricsRepository;
use crate::error::RepositoryError;
use crate::models::{MetadataMetrics, Metrics, TeamProgress};

pub struct HttpMetricsRepository {
    client: ApiClient,
}

impl HttpMetricsRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsRepository for HttpMetricsRepository {
    async fn get_user_metrics(&self, dataset_id: &str) -> Result<Metrics, RepositoryError> {
        let dto: UserMetricsDto = self
            .client
            .get(&format!("/me/datasets/{}/metrics", dataset_id), "metrics")
            .await?;
        dto.into_metrics(dataset_id)
    }

    async fn get_team_progress(&self, dataset_id: &str) -> Result<TeamProgress, RepositoryError> {
        let dto: DatasetProgressDto = self
            .client
            .get(&format!("/datasets/{}/progress", dataset_id), "progress")
            .await?;
        dto.into_team_progress(dataset_id)
    }

    async fn get_metadata_metrics(
        &self,
        property_id: &str,
    ) -> Result<MetadataMetrics, RepositoryError> {
        let dto: MetadataMetricsDto = self
            .client
            .get(
                &format!("/metadata-properties/{}/metrics", property_id),
                "metadata metrics",
            )
            .await?;
        MetadataMetrics::try_from(dto)
    }
}
