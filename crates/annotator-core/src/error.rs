/// Errors raised at the repository boundary.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Non-2xx answer. `response` is the coarse code reported by the backend.
    #[error("Backend error ({status}): {response}")]
    Backend { status: u16, response: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode {entity} payload: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {entity} payload: {reason}")]
    InvalidPayload { entity: &'static str, reason: String },
}

impl RepositoryError {
    pub fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        RepositoryError::InvalidPayload {
            entity,
            reason: reason.into(),
        }
    }

    /// Coarse response code, as surfaced to view models.
    pub fn response(&self) -> &str {
        match self {
            RepositoryError::Backend { response, .. } => response,
            RepositoryError::Transport(_) => "transport_error",
            RepositoryError::Decode { .. } | RepositoryError::InvalidPayload { .. } => {
                "invalid_payload"
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RepositoryError::Backend { status, .. } => Some(*status),
            RepositoryError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors returned by use cases and view models.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Misuse of an entity or view model (caught during development).
    #[error("Guard violation: {0}")]
    Guard(String),
}

impl CoreError {
    pub fn guard(message: impl Into<String>) -> Self {
        CoreError::Guard(message.into())
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, CoreError::Guard(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_response_code() {
        let err = RepositoryError::Backend {
            status: 404,
            response: "not_found".to_string(),
        };
        assert_eq!(err.response(), "not_found");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Backend error (404): not_found");
    }

    #[test]
    fn test_invalid_payload() {
        let err = RepositoryError::invalid("metrics", "negative count");
        assert_eq!(err.response(), "invalid_payload");
        assert_eq!(err.status(), None);

        let core: CoreError = err.into();
        assert!(!core.is_guard());
        assert_eq!(core.to_string(), "Invalid metrics payload: negative count");
    }
}
