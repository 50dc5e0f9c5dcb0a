//! Plan catalog accessors
//!
//! Lookups by raw slug silently fall back to the free plan so a bad or missing
//! slug never denies service outright.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use signdeck_shared::{
    BillingCadence, Catalog, Feature, FeatureCategory, FeatureInfo, LimitResource, Plan,
};

pub fn plan_features<'a>(catalog: &'a Catalog, slug: &str) -> &'a BTreeSet<Feature> {
    &catalog.plan_or_free(slug).features
}

pub fn plan_limits<'a>(catalog: &'a Catalog, slug: &str) -> &'a BTreeMap<LimitResource, Option<u64>> {
    &catalog.plan_or_free(slug).limits
}

/// Plans in display order; `include_custom_priced = false` drops contact-sales plans
pub fn all_plans(catalog: &Catalog, include_custom_priced: bool) -> Vec<&Plan> {
    let mut plans: Vec<&Plan> = catalog
        .plans()
        .iter()
        .filter(|plan| include_custom_priced || !plan.is_custom_priced())
        .collect();
    plans.sort_by_key(|plan| plan.display_order);
    plans
}

/// Partition feature keys by category. Unknown keys are skipped.
pub fn group_features_by_category<'k>(
    feature_keys: impl IntoIterator<Item = &'k str>,
) -> BTreeMap<FeatureCategory, Vec<FeatureInfo>> {
    let mut groups: BTreeMap<FeatureCategory, Vec<FeatureInfo>> = BTreeMap::new();
    for feature in feature_keys
        .into_iter()
        .filter_map(|key| key.parse::<Feature>().ok())
    {
        groups.entry(feature.category()).or_default().push(feature.info());
    }
    groups
}

/// Render a price: `None` → "Contact Sales", `0` → "Free", else `$29/mo`, `$290/year`, `$29.50/mo`
pub fn format_plan_price(cents: Option<u32>, cadence: BillingCadence) -> String {
    let Some(cents) = cents else {
        return "Contact Sales".to_string();
    };
    if cents == 0 {
        return "Free".to_string();
    }

    let dollars = cents / 100;
    let remainder = cents % 100;
    if remainder == 0 {
        format!("${}{}", dollars, cadence.suffix())
    } else {
        format!("${}.{:02}{}", dollars, remainder, cadence.suffix())
    }
}

/// Whether one more resource fits under a plan limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceLimitCheck {
    pub resource: LimitResource,
    pub current: u64,
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub allowed: bool,
}

pub fn check_resource_limit(
    catalog: &Catalog,
    slug: &str,
    resource: LimitResource,
    current: u64,
) -> ResourceLimitCheck {
    let limit = catalog.plan_or_free(slug).limit(resource);
    ResourceLimitCheck {
        resource,
        current,
        limit,
        remaining: limit.map(|l| l.saturating_sub(current)),
        allowed: limit.map_or(true, |l| current < l),
    }
}
