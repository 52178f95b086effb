use async_trait::async_trait;

use super::api_client::ApiClient;
use super::dto::VectorDto;
use super::VectorRepository;
use crate::error::RepositoryError;
use crate::models::{Vector, VectorKey};

pub struct HttpVectorRepository {
    client: ApiClient,
}

impl HttpVectorRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VectorRepository for HttpVectorRepository {
    async fn get_vector(&self, key: &VectorKey) -> Result<Vector, RepositoryError> {
        let dto: VectorDto = self
            .client
            .get(
                &format!("/records/{}/vectors/{}", key.record_id, key.vector_name),
                "vector",
            )
            .await?;
        if dto.values.is_empty() {
            return Err(RepositoryError::invalid("vector", "no values"));
        }
        Ok(Vector {
            key: key.clone(),
            values: dto.values,
        })
    }
}
