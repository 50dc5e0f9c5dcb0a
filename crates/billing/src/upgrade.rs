//! Upgrade-path advice
//!
//! Used by pricing pages and by gating errors to point a tenant at the
//! cheapest plan that unlocks what they asked for.

use serde::Serialize;
use signdeck_shared::{Catalog, Feature, PlanSlug};

/// Cheapest plan a tenant needs for a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradePath {
    pub required: PlanSlug,
    pub name: String,
}

/// First plan in rank order that includes the feature.
///
/// `None` for unknown keys or features no plan sells.
pub fn minimum_plan_for_feature(catalog: &Catalog, feature_key: &str) -> Option<PlanSlug> {
    catalog
        .plans()
        .iter()
        .find(|plan| plan.has_feature_key(feature_key))
        .map(|plan| plan.slug)
}

/// Features in `to` that `from` lacks, in enumeration order
pub fn features_gained_by_upgrade(catalog: &Catalog, from: PlanSlug, to: PlanSlug) -> Vec<Feature> {
    let from = &catalog.plan(from).features;
    catalog
        .plan(to)
        .features
        .difference(from)
        .copied()
        .collect()
}

/// `None` when the current plan (unknown = free) already has the feature
pub fn upgrade_path_for_feature(
    catalog: &Catalog,
    feature_key: &str,
    current_plan: &str,
) -> Option<UpgradePath> {
    if catalog.plan_or_free(current_plan).has_feature_key(feature_key) {
        return None;
    }

    let required = minimum_plan_for_feature(catalog, feature_key)?;
    Some(UpgradePath {
        required,
        name: catalog.plan(required).name.clone(),
    })
}

/// Three-way comparison by rank: negative, zero or positive
pub fn compare_plans(a: PlanSlug, b: PlanSlug) -> i32 {
    i32::from(a.rank()) - i32::from(b.rank())
}

pub fn is_plan_at_least(current: PlanSlug, required: PlanSlug) -> bool {
    compare_plans(current, required) >= 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use signdeck_shared::standard_catalog;

    #[test]
    fn test_minimum_plan_for_feature() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(minimum_plan_for_feature(&catalog, "screens"), Some(PlanSlug::Free));
        assert_eq!(minimum_plan_for_feature(&catalog, "templates"), Some(PlanSlug::Starter));
        assert_eq!(minimum_plan_for_feature(&catalog, "webhooks"), Some(PlanSlug::Pro));
        assert_eq!(minimum_plan_for_feature(&catalog, "sso"), Some(PlanSlug::Enterprise));
        assert_eq!(minimum_plan_for_feature(&catalog, "sub_accounts"), Some(PlanSlug::Reseller));
        assert_eq!(minimum_plan_for_feature(&catalog, "unknown_x"), None);
    }

    #[test]
    fn test_adjacent_upgrades_gain_new_features() {
        let catalog = standard_catalog().unwrap();
        for pair in PlanSlug::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let gained = features_gained_by_upgrade(&catalog, lower, higher);
            assert!(!gained.is_empty(), "{} -> {} gains nothing", lower, higher);
            let lower_features = &catalog.plan(lower).features;
            assert!(gained.iter().all(|f| !lower_features.contains(f)));
        }
    }

    #[test]
    fn test_downgrade_gains_nothing() {
        let catalog = standard_catalog().unwrap();
        assert!(features_gained_by_upgrade(&catalog, PlanSlug::Pro, PlanSlug::Free).is_empty());
        assert!(features_gained_by_upgrade(&catalog, PlanSlug::Pro, PlanSlug::Pro).is_empty());
    }

    #[test]
    fn test_gained_features_pro_to_enterprise() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(
            features_gained_by_upgrade(&catalog, PlanSlug::Pro, PlanSlug::Enterprise),
            vec![
                Feature::Sso,
                Feature::IpAllowlist,
                Feature::CustomDomain,
                Feature::WhiteLabel,
                Feature::DedicatedAccountManager,
            ]
        );
    }

    #[test]
    fn test_upgrade_path_for_feature() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(upgrade_path_for_feature(&catalog, "templates", "pro"), None);
        assert_eq!(
            upgrade_path_for_feature(&catalog, "webhooks", "starter"),
            Some(UpgradePath {
                required: PlanSlug::Pro,
                name: "Pro".to_string()
            })
        );
        // Unknown current plan is treated as free
        assert_eq!(
            upgrade_path_for_feature(&catalog, "templates", "legacy"),
            Some(UpgradePath {
                required: PlanSlug::Starter,
                name: "Starter".to_string()
            })
        );
        assert_eq!(upgrade_path_for_feature(&catalog, "unknown_x", "free"), None);
    }

    #[test]
    fn test_compare_plans() {
        assert_eq!(compare_plans(PlanSlug::Pro, PlanSlug::Pro), 0);
        assert_eq!(compare_plans(PlanSlug::Free, PlanSlug::Reseller), -4);
        assert_eq!(compare_plans(PlanSlug::Enterprise, PlanSlug::Starter), 2);
    }

    #[test]
    fn test_is_plan_at_least() {
        assert!(is_plan_at_least(PlanSlug::Pro, PlanSlug::Starter));
        assert!(is_plan_at_least(PlanSlug::Pro, PlanSlug::Pro));
        assert!(!is_plan_at_least(PlanSlug::Starter, PlanSlug::Pro));
        for plan in PlanSlug::ALL {
            assert!(is_plan_at_least(plan, PlanSlug::Free));
        }
    }
}
