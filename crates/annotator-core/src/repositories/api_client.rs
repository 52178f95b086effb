use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::CoreConfig;
use crate::constants::{API_KEY_HEADER, API_VERSION_PREFIX};
use crate::error::RepositoryError;

/// Thin JSON client for the `/v1` REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &CoreConfig) -> Result<Self, RepositoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an API path such as `/me/datasets`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_VERSION_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        entity: &'static str,
    ) -> Result<T, RepositoryError> {
        self.send(self.request(Method::GET, path), entity).await
    }

    pub async fn get_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        entity: &'static str,
    ) -> Result<T, RepositoryError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, path).query(query), entity)
            .await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        entity: &'static str,
    ) -> Result<T, RepositoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body), entity)
            .await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: &B,
        entity: &'static str,
    ) -> Result<T, RepositoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body), entity)
            .await
    }

    pub async fn patch<B, T>(
        &self,
        path: &str,
        body: &B,
        entity: &'static str,
    ) -> Result<T, RepositoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PATCH, path).json(body), entity)
            .await
    }

    /// DELETE, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), RepositoryError> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        entity: &'static str,
    ) -> Result<T, RepositoryError> {
        let response = builder.send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        trace!(entity, size = bytes.len(), "response received");
        serde_json::from_slice(&bytes).map_err(|source| RepositoryError::Decode { entity, source })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RepositoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let code = response_code(status, &body);
        debug!(%url, status = status.as_u16(), %code, "backend request failed");
        Err(RepositoryError::Backend {
            status: status.as_u16(),
            response: code,
        })
    }
}

/// The backend reports errors as `{"detail": {"code": ...}}` or
/// `{"detail": "..."}`; anything else falls back to the HTTP status.
fn response_code(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("detail").cloned());

    match detail {
        Some(Value::Object(detail)) => {
            if let Some(code) = detail.get("code").and_then(|c| c.as_str()) {
                return code.to_string();
            }
        }
        Some(Value::String(message)) if !message.is_empty() => return message,
        _ => {}
    }

    status
        .canonical_reason()
        .map(|reason| reason.to_lowercase().replace(' ', "_"))
        .unwrap_or_else(|| format!("http_{}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let config = CoreConfig::new("http://localhost:6900/", "/tmp");
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:6900");
        assert_eq!(client.url("/me/datasets"), "http://localhost:6900/v1/me/datasets");
    }

    #[test]
    fn test_response_code_from_detail_object() {
        let body = r#"{"detail": {"code": "argilla.api.errors::EntityNotFoundError", "params": {}}}"#;
        assert_eq!(
            response_code(StatusCode::NOT_FOUND, body),
            "argilla.api.errors::EntityNotFoundError"
        );
    }

    #[test]
    fn test_response_code_from_detail_string() {
        let body = r#"{"detail": "Dataset is not ready"}"#;
        assert_eq!(response_code(StatusCode::UNPROCESSABLE_ENTITY, body), "Dataset is not ready");
    }

    #[test]
    fn test_response_code_fallback() {
        assert_eq!(response_code(StatusCode::NOT_FOUND, "<html>"), "not_found");
        assert_eq!(response_code(StatusCode::FORBIDDEN, ""), "forbidden");
    }
}
