//! Feature resolution routes

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use signdeck_billing::upgrade::minimum_plan_for_feature;
use signdeck_billing::{
    EffectiveFeatures, Entitlement, FeatureNotEnabledError, FeatureResolution, ResolutionContext,
};
use signdeck_shared::PlanSlug;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ResolveFeaturesRequest {
    #[serde(default)]
    pub context: ResolutionContext,
    /// Keys to resolve; every known feature when absent
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ResolveFeaturesResponse {
    pub plan: PlanSlug,
    pub features: BTreeMap<String, FeatureResolution>,
    pub snapshot_version: u64,
}

/// Resolve listed features (or all of them) for a context
pub async fn resolve_features(
    State(state): State<AppState>,
    Json(req): Json<ResolveFeaturesRequest>,
) -> Json<ResolveFeaturesResponse> {
    let snapshot = state.entitlements.snapshot();
    let resolver = snapshot.features();

    let features = match &req.features {
        Some(keys) => resolver
            .resolve_features(keys.iter().map(String::as_str), &req.context)
            .into_iter()
            .collect(),
        None => resolver
            .resolve_all_features(&req.context)
            .into_iter()
            .map(|(feature, resolution)| (feature.key().to_string(), resolution))
            .collect(),
    };

    Json(ResolveFeaturesResponse {
        plan: req.context.plan_slug(),
        features,
        snapshot_version: snapshot.version(),
    })
}

/// Diagnostic view: every feature grouped by the tier that decided it
pub async fn effective_features(
    State(state): State<AppState>,
    Json(ctx): Json<ResolutionContext>,
) -> Json<EffectiveFeatures> {
    Json(state.entitlements.snapshot().features().effective_features(&ctx))
}

#[derive(Debug, Deserialize)]
pub struct RequireFeaturesRequest {
    #[serde(default)]
    pub context: ResolutionContext,
    pub features: Vec<String>,
}

/// 204 when every listed feature is enabled, 403 naming the first one that is not
pub async fn require_features(
    State(state): State<AppState>,
    Json(req): Json<RequireFeaturesRequest>,
) -> ApiResult<StatusCode> {
    if req.features.is_empty() {
        return Err(ApiError::Validation(
            "At least one feature key is required".to_string(),
        ));
    }

    let snapshot = state.entitlements.snapshot();
    let check = snapshot
        .features()
        .check_required_features(req.features.iter().map(String::as_str), &req.context);

    let Some(first) = check.missing.first() else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let required_plan = minimum_plan_for_feature(snapshot.catalog(), first);
    tracing::info!(
        feature_key = %first,
        plan = %req.context.plan_slug(),
        tenant_id = ?req.context.tenant_id,
        missing = check.missing.len(),
        "Required features not enabled"
    );

    let err = FeatureNotEnabledError::new(first.clone(), required_plan);
    Err(ApiError::FeatureNotEnabled(err, check.missing))
}

/// Full entitlement for a tenant
pub async fn get_entitlement(
    State(state): State<AppState>,
    Json(ctx): Json<ResolutionContext>,
) -> Json<Entitlement> {
    let entitlement = state.entitlements.compute_entitlement(&ctx);

    tracing::debug!(
        tenant_id = ?entitlement.tenant_id,
        plan = %entitlement.plan,
        features = entitlement.features.len(),
        version = entitlement.snapshot_version,
        "Entitlement computed"
    );

    Json(entitlement)
}
