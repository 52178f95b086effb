use std::sync::Arc;
use tracing::trace;

use crate::error::CoreError;
use crate::models::{Vector, VectorKey};
use crate::repositories::VectorRepository;
use crate::store::KeyedStore;

/// Vectors do not change once stored, so a cached value is served without
/// a request.
pub struct GetRecordVectorUseCase {
    repository: Arc<dyn VectorRepository>,
    cache: Arc<KeyedStore>,
}

impl GetRecordVectorUseCase {
    pub fn new(repository: Arc<dyn VectorRepository>, cache: Arc<KeyedStore>) -> Self {
        Self { repository, cache }
    }

    pub async fn execute(&self, key: &VectorKey) -> Result<Vector, CoreError> {
        let cache_key = key.to_string();
        if let Some(vector) = self.cache.get::<Vector>(&cache_key) {
            trace!(%cache_key, "vector served from cache");
            return Ok(vector);
        }
        let vector = self.repository.get_vector(key).await?;
        self.cache.set(cache_key, vector.clone());
        Ok(vector)
    }
}
