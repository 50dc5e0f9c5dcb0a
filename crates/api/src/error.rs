//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use signdeck_billing::{BillingError, FeatureNotEnabledError, QuotaExceededError};
use signdeck_shared::CatalogError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Entitlement errors
    /// First disabled feature plus every disabled key that was requested
    #[error("{0}")]
    FeatureNotEnabled(FeatureNotEnabledError, Vec<String>),
    #[error("{0}")]
    QuotaExceeded(#[from] QuotaExceededError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Validation
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::InvalidCatalog(_) => (StatusCode::BAD_REQUEST, "INVALID_CATALOG", self.to_string()),

            // Resources
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),

            // Entitlements
            ApiError::FeatureNotEnabled(err, _) => (StatusCode::FORBIDDEN, err.code(), err.to_string()),
            ApiError::QuotaExceeded(err) => (StatusCode::TOO_MANY_REQUESTS, err.code(), err.message().to_string()),
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });

        match &self {
            ApiError::FeatureNotEnabled(err, missing) => {
                error["feature_key"] = json!(err.feature_key);
                error["required_plan"] = json!(err.required_plan);
                error["missing"] = json!(missing);
            }
            ApiError::QuotaExceeded(err) => {
                error["feature_key"] = json!(err.feature_key);
                error["current_usage"] = json!(err.current_usage);
                error["quota"] = json!(err.quota);
                error["plan_slug"] = json!(err.plan_slug);
            }
            _ => {}
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<FeatureNotEnabledError> for ApiError {
    fn from(err: FeatureNotEnabledError) -> Self {
        let missing = vec![err.feature_key.clone()];
        ApiError::FeatureNotEnabled(err, missing)
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::FeatureNotEnabled(e) => e.into(),
            BillingError::QuotaExceeded(e) => e.into(),
            BillingError::InvalidCatalog(e) => e.into(),
            BillingError::InvalidInput(msg) => ApiError::Validation(msg),
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
