//! Operator routes for hot-swapping the entitlement snapshot
//!
//! Only mounted when `ENABLE_ADMIN_ROUTES` is set.

use axum::{extract::State, Json};
use serde::Serialize;
use signdeck_billing::GlobalFlags;
use signdeck_shared::Catalog;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize)]
pub struct SnapshotSwapResponse {
    pub version: u64,
    pub catalog_version: String,
    pub global_flags: GlobalFlags,
}

/// Replace the global default-flag table in one step
pub async fn replace_flags(
    State(state): State<AppState>,
    Json(flags): Json<GlobalFlags>,
) -> Json<SnapshotSwapResponse> {
    let version = state.entitlements.replace_flags(flags);
    Json(swap_response(&state, version))
}

/// Replace the plan catalog. The body is validated like any published catalog.
pub async fn replace_catalog(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<SnapshotSwapResponse>> {
    let catalog = Catalog::from_json(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected catalog replacement");
    })?;

    let version = state.entitlements.replace_catalog(catalog);
    Ok(Json(swap_response(&state, version)))
}

fn swap_response(state: &AppState, version: u64) -> SnapshotSwapResponse {
    let snapshot = state.entitlements.snapshot();
    SnapshotSwapResponse {
        version,
        catalog_version: snapshot.catalog().version().to_string(),
        global_flags: snapshot.flags().clone(),
    }
}
