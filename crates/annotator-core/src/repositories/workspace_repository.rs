use async_trait::async_trait;

use super::api_client::ApiClient;
use super::dto::{ItemsDto, WorkspaceDto};
use super::WorkspaceRepository;
use crate::error::RepositoryError;
use crate::models::{Workspace, Workspaces};

pub struct HttpWorkspaceRepository {
    client: ApiClient,
}

impl HttpWorkspaceRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkspaceRepository for HttpWorkspaceRepository {
    async fn get_workspaces(&self) -> Result<Workspaces, RepositoryError> {
        let dto: ItemsDto<WorkspaceDto> = self.client.get("/me/workspaces", "workspaces").await?;
        Ok(Workspaces::new(
            dto.items.into_iter().map(Workspace::from).collect(),
        ))
    }
}
