use async_trait::async_trait;
use tracing::debug;

use super::api_client::ApiClient;
use super::dto::{DatasetDto, DatasetUpdateDto, ItemsDto};
use super::DatasetRepository;
use crate::error::RepositoryError;
use crate::models::{Dataset, Datasets};

pub struct HttpDatasetRepository {
    client: ApiClient,
}

impl HttpDatasetRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatasetRepository for HttpDatasetRepository {
    async fn get_datasets(&self) -> Result<Datasets, RepositoryError> {
        let dto: ItemsDto<DatasetDto> = self.client.get("/me/datasets", "datasets").await?;
        let items = dto
            .items
            .into_iter()
            .map(Dataset::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = items.len(), "datasets fetched");
        Ok(Datasets::new(items))
    }

    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset, RepositoryError> {
        let dto: DatasetDto = self
            .client
            .get(&format!("/datasets/{}", dataset_id), "dataset")
            .await?;
        Dataset::try_from(dto)
    }

    async fn update_guidelines(
        &self,
        dataset_id: &str,
        guidelines: &str,
    ) -> Result<Dataset, RepositoryError> {
        let dto: DatasetDto = self
            .client
            .patch(
                &format!("/datasets/{}", dataset_id),
                &DatasetUpdateDto { guidelines },
                "dataset",
            )
            .await?;
        Dataset::try_from(dto)
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), RepositoryError> {
        self.client
            .delete(&format!("/datasets/{}", dataset_id))
            .await
    }
}
