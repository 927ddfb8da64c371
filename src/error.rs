use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::storage::StorageError;

/// Terminal proxy failures / 代理终止性错误
///
/// Misses are not errors: they advance the candidate list or fall through to the next handler.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("malformed request path: {0}")]
    MalformedPath(String),

    #[error("could not read S3 keys under '{prefix}': {source}")]
    Listing {
        prefix: String,
        #[source]
        source: StorageError,
    },

    #[error("could not fetch S3 object '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("invalid proxy configuration: {0}")]
    Config(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MalformedPath(_) => StatusCode::BAD_REQUEST,
            ProxyError::Listing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        (
            status,
            Json(json!({
                "code": status.as_u16(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::MalformedPath("%FF".into()).status_code(), StatusCode::BAD_REQUEST);
        let listing = ProxyError::Listing {
            prefix: "docs/".into(),
            source: StorageError::UnexpectedStatus(503),
        };
        assert_eq!(listing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(listing.to_string().contains("docs/"));

        let fetch = ProxyError::Fetch {
            key: "a.txt".into(),
            source: StorageError::UnexpectedStatus(403),
        };
        assert_eq!(fetch.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
