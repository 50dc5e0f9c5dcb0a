//! Upgrade advice routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use signdeck_billing::upgrade::{features_gained_by_upgrade, upgrade_path_for_feature};
use signdeck_billing::{compare_plans, UpgradePath};
use signdeck_shared::{Feature, PlanSlug};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpgradePathQuery {
    pub feature: Option<String>,
    #[serde(default)]
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct UpgradePathResponse {
    pub feature_key: String,
    pub current_plan: PlanSlug,
    /// `None` when the current plan already includes the feature, or no plan sells it
    pub upgrade: Option<UpgradePath>,
    /// Everything the suggested upgrade unlocks
    pub gained_features: Vec<Feature>,
}

/// Cheapest plan that unlocks a feature for the caller's current plan
pub async fn get_upgrade_path(
    State(state): State<AppState>,
    Query(query): Query<UpgradePathQuery>,
) -> ApiResult<Json<UpgradePathResponse>> {
    let feature_key = query
        .feature
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ApiError::Validation("feature query parameter is required".to_string()))?;

    let snapshot = state.entitlements.snapshot();
    let catalog = snapshot.catalog();
    let current_plan = PlanSlug::from_str_lossy(&query.plan);
    let upgrade = upgrade_path_for_feature(catalog, feature_key, &query.plan);

    let gained_features = match &upgrade {
        Some(path) if compare_plans(path.required, current_plan) > 0 => {
            features_gained_by_upgrade(catalog, current_plan, path.required)
        }
        _ => Vec::new(),
    };

    Ok(Json(UpgradePathResponse {
        feature_key: feature_key.to_string(),
        current_plan,
        upgrade,
        gained_features,
    }))
}
