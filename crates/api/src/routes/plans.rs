//! Catalog and plan listing routes

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use signdeck_billing::plans::{all_plans, check_resource_limit, group_features_by_category};
use signdeck_billing::{format_plan_price, ResourceLimitCheck};
use signdeck_shared::{
    BillingCadence, Catalog, Feature, FeatureCategory, FeatureInfo, LimitResource, Plan, PlanSlug,
};

use crate::state::AppState;

/// The published catalog, byte-for-byte what clients resolve against
pub async fn get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.entitlements.snapshot().catalog().clone())
}

/// Feature metadata grouped by category
pub async fn list_features() -> Json<BTreeMap<FeatureCategory, Vec<FeatureInfo>>> {
    Json(group_features_by_category(Feature::ALL.iter().map(|f| f.key())))
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    #[serde(default = "default_include_custom_priced")]
    pub include_custom_priced: bool,
}

fn default_include_custom_priced() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub slug: PlanSlug,
    pub name: String,
    pub description: String,
    pub rank: u8,
    pub monthly_price: String,
    pub yearly_price: String,
    pub monthly_price_cents: Option<u32>,
    pub yearly_price_cents: Option<u32>,
    pub is_custom_priced: bool,
    pub features: Vec<Feature>,
    pub limits: BTreeMap<LimitResource, Option<u64>>,
    pub quotas: BTreeMap<Feature, Option<u64>>,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        Self {
            slug: plan.slug,
            name: plan.name.clone(),
            description: plan.description.clone(),
            rank: plan.rank,
            monthly_price: format_plan_price(plan.monthly_price_cents, BillingCadence::Monthly),
            yearly_price: format_plan_price(plan.yearly_price_cents, BillingCadence::Yearly),
            monthly_price_cents: plan.monthly_price_cents,
            yearly_price_cents: plan.yearly_price_cents,
            is_custom_priced: plan.is_custom_priced(),
            features: plan.features.iter().copied().collect(),
            limits: plan.limits.clone(),
            quotas: plan.quotas.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPlansResponse {
    pub catalog_version: String,
    pub plans: Vec<PlanSummary>,
}

/// List plans in display order
pub async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<ListPlansQuery>,
) -> Json<ListPlansResponse> {
    let snapshot = state.entitlements.snapshot();
    let catalog = snapshot.catalog();

    Json(ListPlansResponse {
        catalog_version: catalog.version().to_string(),
        plans: all_plans(catalog, query.include_custom_priced)
            .into_iter()
            .map(PlanSummary::from)
            .collect(),
    })
}

#[derive(Debug, Deserialize)]
pub struct CheckLimitRequest {
    #[serde(default)]
    pub plan: String,
    pub resource: LimitResource,
    pub current: u64,
}

/// Whether one more resource fits under the plan limit
pub async fn check_limit(
    State(state): State<AppState>,
    Json(req): Json<CheckLimitRequest>,
) -> Json<ResourceLimitCheck> {
    let snapshot = state.entitlements.snapshot();
    let check = check_resource_limit(snapshot.catalog(), &req.plan, req.resource, req.current);

    if !check.allowed {
        tracing::info!(
            plan = %req.plan,
            resource = %req.resource,
            current = req.current,
            limit = ?check.limit,
            "Resource limit reached"
        );
    }

    Json(check)
}
