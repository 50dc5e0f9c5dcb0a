//! Quota routes

use axum::{extract::State, Json};
use serde::Deserialize;
use signdeck_billing::{QuotaReport, ResolutionContext};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CheckQuotaRequest {
    #[serde(default)]
    pub context: ResolutionContext,
    pub feature_key: String,
    pub used: u64,
    /// Answer 429 instead of a report once the quota is reached
    #[serde(default)]
    pub enforce: bool,
}

/// Report usage against the effective quota for a feature
pub async fn check_quota(
    State(state): State<AppState>,
    Json(req): Json<CheckQuotaRequest>,
) -> ApiResult<Json<QuotaReport>> {
    let feature_key = req.feature_key.trim();
    if feature_key.is_empty() {
        return Err(ApiError::Validation("feature_key must not be empty".to_string()));
    }

    let snapshot = state.entitlements.snapshot();
    let report = if req.enforce {
        snapshot.enforce_quota(feature_key, req.used, &req.context)?
    } else {
        snapshot.check_quota(feature_key, req.used, &req.context)
    };

    Ok(Json(report))
}
