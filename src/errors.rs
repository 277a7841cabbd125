//! Error types of the service and HTTP layers and their JSON rendering.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use sea_orm::{DbErr, TransactionError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-2xx response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "Validation error: price_from must be a number",
    "request_id": "6c1d3b4e-52f1-4a53-9d1e-0f3e1c0d7a11",
    "timestamp": "2024-03-01T09:15:00+00:00"
}))]
pub struct ErrorResponse {
    /// Canonical reason of the status code
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Echo of the `x-request-id` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    fn for_status(status: StatusCode, message: String) -> Self {
        Self {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
            request_id: crate::tracing::current_request_id().map(|id| id.to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Failures raised by the catalog services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}

impl ServiceError {
    /// Unwraps the error returned from inside a transaction closure
    pub fn from_transaction(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db) => Self::DatabaseError(db),
            TransactionError::Transaction(inner) => inner,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::MigrationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; server-side failures are not described
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::MigrationError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        ErrorResponse::for_status(status, self.response_message()).into_response_with(status)
    }
}

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Request body failed its declarative validation rules
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Service(err) => err.into_response(),
            Self::InvalidRequest(message) => {
                ErrorResponse::for_status(StatusCode::BAD_REQUEST, message)
                    .into_response_with(StatusCode::BAD_REQUEST)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracing::{scope_request_id, RequestId};
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn error_body_carries_the_scoped_request_id() {
        let response = scope_request_id(RequestId::new("req-404"), async {
            ServiceError::NotFound("Product 7 not found".into()).into_response()
        })
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Not found: Product 7 not found");
        assert_eq!(body.request_id.as_deref(), Some("req-404"));
    }

    #[tokio::test]
    async fn invalid_request_is_bad_request_without_request_id_outside_scope() {
        let response = ApiError::InvalidRequest("sku: length".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body.message, "sku: length");
        assert!(body.request_id.is_none());
    }

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::ValidationError("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ServiceError::MigrationError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn server_side_failures_are_not_described() {
        let db = ServiceError::DatabaseError(DbErr::Custom("relation products missing".into()));
        assert_eq!(db.response_message(), "Database error");
        assert_eq!(
            ServiceError::MigrationError("checksum".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::Conflict("Variant 'Size' already exists".into()).response_message(),
            "Conflict: Variant 'Size' already exists"
        );
    }

    #[test]
    fn transaction_errors_keep_the_inner_service_error() {
        let inner = ServiceError::from_transaction(TransactionError::Transaction(
            ServiceError::ValidationError("row 0".into()),
        ));
        assert!(matches!(inner, ServiceError::ValidationError(_)));

        let connection = ServiceError::from_transaction(TransactionError::Connection(
            DbErr::Custom("gone".into()),
        ));
        assert!(matches!(connection, ServiceError::DatabaseError(_)));
    }
}
