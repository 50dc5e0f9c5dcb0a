//! Quota resolution and usage classification
//!
//! Quotas fail open: an unknown feature key or a feature that is not metered
//! has no ceiling, and an unknown plan slug uses the free plan's table.

use serde::{Deserialize, Serialize};
use signdeck_shared::{Catalog, Feature, PlanSlug};

use crate::error::QuotaExceededError;

/// Usage percentage at which a quota is reported as `warning`
pub const WARNING_THRESHOLD_PERCENT: u64 = 70;
/// Usage percentage at which a quota is reported as `critical`
pub const CRITICAL_THRESHOLD_PERCENT: u64 = 95;
/// Usage percentage at which a quota is reported as `exceeded`
pub const EXCEEDED_THRESHOLD_PERCENT: u64 = 100;

/// Tenant-specific quota adjustment, e.g. negotiated by sales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaOverride {
    #[serde(default)]
    pub monthly_limit: Option<u64>,
    #[serde(default)]
    pub is_unlimited: Option<bool>,
}

impl QuotaOverride {
    pub fn limit(monthly_limit: u64) -> Self {
        Self {
            monthly_limit: Some(monthly_limit),
            is_unlimited: None,
        }
    }

    pub fn unlimited() -> Self {
        Self {
            monthly_limit: None,
            is_unlimited: Some(true),
        }
    }
}

/// Plan quota for a feature. `None` means unlimited.
pub fn quota_for_feature(catalog: &Catalog, feature_key: &str, plan_slug: &str) -> Option<u64> {
    let feature: Feature = feature_key.parse().ok()?;
    catalog.plan_or_free(plan_slug).quota(feature)
}

pub fn is_quota_unlimited(catalog: &Catalog, feature_key: &str, plan_slug: &str) -> bool {
    quota_for_feature(catalog, feature_key, plan_slug).is_none()
}

/// Apply an override to a plan quota.
///
/// Priority: `is_unlimited` → unlimited; `monthly_limit` (zero included) →
/// that limit; otherwise the plan quota unchanged.
pub fn apply_quota_override(plan_quota: Option<u64>, quota_override: Option<&QuotaOverride>) -> Option<u64> {
    match quota_override {
        Some(o) if o.is_unlimited == Some(true) => None,
        Some(QuotaOverride {
            monthly_limit: Some(limit),
            ..
        }) => Some(*limit),
        _ => plan_quota,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaStatus {
    Ok,
    Warning,
    Critical,
    Exceeded,
    Unlimited,
}

impl QuotaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaStatus::Ok => "ok",
            QuotaStatus::Warning => "warning",
            QuotaStatus::Critical => "critical",
            QuotaStatus::Exceeded => "exceeded",
            QuotaStatus::Unlimited => "unlimited",
        }
    }
}

impl std::fmt::Display for QuotaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage measured against a quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    pub used: u64,
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// Rounded, may exceed 100. `None` when unlimited.
    pub percentage: Option<u64>,
    pub status: QuotaStatus,
    pub is_exceeded: bool,
}

impl QuotaUsage {
    /// Classify usage against a quota (`None` = unlimited)
    pub fn classify(used: u64, quota: Option<u64>) -> Self {
        let Some(limit) = quota else {
            return Self {
                used,
                limit: None,
                remaining: None,
                percentage: None,
                status: QuotaStatus::Unlimited,
                is_exceeded: false,
            };
        };

        // A zero quota is exhausted before the first use
        if limit == 0 {
            return Self {
                used,
                limit: Some(0),
                remaining: Some(0),
                percentage: Some(EXCEEDED_THRESHOLD_PERCENT),
                status: QuotaStatus::Exceeded,
                is_exceeded: true,
            };
        }

        // Thresholds apply to the reported percentage; is_exceeded tracks the raw count
        let percentage = rounded_percentage(used, limit);
        let status = if percentage >= EXCEEDED_THRESHOLD_PERCENT {
            QuotaStatus::Exceeded
        } else if percentage >= CRITICAL_THRESHOLD_PERCENT {
            QuotaStatus::Critical
        } else if percentage >= WARNING_THRESHOLD_PERCENT {
            QuotaStatus::Warning
        } else {
            QuotaStatus::Ok
        };

        Self {
            used,
            limit: Some(limit),
            remaining: Some(limit.saturating_sub(used)),
            percentage: Some(percentage),
            status,
            is_exceeded: used >= limit,
        }
    }
}

/// round(used / limit * 100), half rounding up, saturating
fn rounded_percentage(used: u64, limit: u64) -> u64 {
    let numerator = u128::from(used) * 200 + u128::from(limit);
    let denominator = u128::from(limit) * 2;
    u64::try_from(numerator / denominator).unwrap_or(u64::MAX)
}

/// Full quota report for one feature and tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaReport {
    pub feature_key: String,
    pub plan: PlanSlug,
    /// Quota from the plan before any override
    pub plan_quota: Option<u64>,
    pub override_applied: bool,
    #[serde(flatten)]
    pub usage: QuotaUsage,
}

impl QuotaReport {
    pub fn is_exceeded(&self) -> bool {
        self.usage.is_exceeded
    }
}

/// Look up, apply any override and classify usage in one step
pub fn check_quota(
    catalog: &Catalog,
    feature_key: &str,
    plan_slug: &str,
    used: u64,
    quota_override: Option<&QuotaOverride>,
) -> QuotaReport {
    let plan_quota = quota_for_feature(catalog, feature_key, plan_slug);
    let effective = apply_quota_override(plan_quota, quota_override);
    let usage = QuotaUsage::classify(used, effective);

    tracing::debug!(
        feature_key,
        plan = plan_slug,
        used,
        limit = ?effective,
        status = %usage.status,
        "quota checked"
    );

    QuotaReport {
        feature_key: feature_key.to_string(),
        plan: PlanSlug::from_str_lossy(plan_slug),
        plan_quota,
        override_applied: quota_override.is_some() && effective != plan_quota,
        usage,
    }
}

/// Like [`check_quota`], but fails once usage has reached the quota
pub fn enforce_quota(
    catalog: &Catalog,
    feature_key: &str,
    plan_slug: &str,
    used: u64,
    quota_override: Option<&QuotaOverride>,
) -> Result<QuotaReport, QuotaExceededError> {
    let report = check_quota(catalog, feature_key, plan_slug, used, quota_override);
    match report.usage.limit {
        Some(limit) if report.is_exceeded() => {
            tracing::warn!(
                feature_key,
                plan = plan_slug,
                used,
                limit,
                "Quota exceeded"
            );
            Err(QuotaExceededError::new(feature_key, used, limit, plan_slug))
        }
        _ => Ok(report),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use signdeck_shared::standard_catalog;

    #[test]
    fn test_quota_lookup() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(quota_for_feature(&catalog, "ai_assistant", "free"), Some(25));
        assert_eq!(quota_for_feature(&catalog, "api_calls", "pro"), Some(250_000));
        assert_eq!(quota_for_feature(&catalog, "webhooks", "enterprise"), None);
    }

    #[test]
    fn test_unknown_plan_uses_free_table() {
        let catalog = standard_catalog().unwrap();
        for feature in Feature::METERED {
            assert_eq!(
                quota_for_feature(&catalog, feature.key(), "platinum"),
                quota_for_feature(&catalog, feature.key(), "free"),
            );
        }
    }

    #[test]
    fn test_unknown_feature_is_unlimited() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(quota_for_feature(&catalog, "unknown_x", "pro"), None);
        assert!(is_quota_unlimited(&catalog, "unknown_x", "pro"));
        // Unmetered features have no ceiling either
        assert!(is_quota_unlimited(&catalog, "screens", "free"));
    }

    #[test]
    fn test_is_unlimited_matches_lookup_for_every_pair() {
        let catalog = standard_catalog().unwrap();
        let keys = Feature::ALL
            .iter()
            .map(|f| f.key())
            .chain(["unknown_x", ""]);
        for key in keys {
            for plan in ["free", "starter", "pro", "enterprise", "reseller", "bogus"] {
                assert_eq!(
                    is_quota_unlimited(&catalog, key, plan),
                    quota_for_feature(&catalog, key, plan).is_none()
                );
            }
        }
    }

    #[test]
    fn test_quota_progression() {
        let catalog = standard_catalog().unwrap();
        for feature in Feature::METERED {
            let q = |plan: &str| quota_for_feature(&catalog, feature.key(), plan);
            let free = q("free").unwrap();
            let starter = q("starter").unwrap();
            let pro = q("pro").unwrap();
            assert!(free < starter && starter < pro, "{}", feature);
            assert_eq!(q("enterprise"), None);
            assert_eq!(q("reseller"), None);
        }
    }

    #[test]
    fn test_override_priority() {
        assert_eq!(apply_quota_override(Some(10), None), Some(10));
        assert_eq!(apply_quota_override(Some(10), Some(&QuotaOverride::default())), Some(10));
        assert_eq!(apply_quota_override(Some(10), Some(&QuotaOverride::limit(50))), Some(50));
        assert_eq!(apply_quota_override(None, Some(&QuotaOverride::limit(50))), Some(50));
        // Zero is a real limit, not "unset"
        assert_eq!(apply_quota_override(Some(10), Some(&QuotaOverride::limit(0))), Some(0));
        assert_eq!(apply_quota_override(Some(10), Some(&QuotaOverride::unlimited())), None);

        let both = QuotaOverride {
            monthly_limit: Some(5),
            is_unlimited: Some(true),
        };
        assert_eq!(apply_quota_override(Some(10), Some(&both)), None);

        let not_unlimited = QuotaOverride {
            monthly_limit: None,
            is_unlimited: Some(false),
        };
        assert_eq!(apply_quota_override(Some(10), Some(&not_unlimited)), Some(10));
    }

    #[test]
    fn test_override_deserializes_camel_case() {
        let o: QuotaOverride = serde_json::from_str(r#"{"monthlyLimit":0}"#).unwrap();
        assert_eq!(o, QuotaOverride::limit(0));
        let o: QuotaOverride = serde_json::from_str(r#"{"isUnlimited":true}"#).unwrap();
        assert_eq!(o, QuotaOverride::unlimited());
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(QuotaUsage::classify(69, Some(100)).status, QuotaStatus::Ok);
        assert_eq!(QuotaUsage::classify(70, Some(100)).status, QuotaStatus::Warning);
        assert_eq!(QuotaUsage::classify(94, Some(100)).status, QuotaStatus::Warning);
        assert_eq!(QuotaUsage::classify(95, Some(100)).status, QuotaStatus::Critical);
        assert_eq!(QuotaUsage::classify(99, Some(100)).status, QuotaStatus::Critical);
        assert_eq!(QuotaUsage::classify(100, Some(100)).status, QuotaStatus::Exceeded);
        assert_eq!(QuotaUsage::classify(150, Some(100)).status, QuotaStatus::Exceeded);
    }

    #[test]
    fn test_exceeded_boundary() {
        let at = QuotaUsage::classify(10, Some(10));
        assert!(at.is_exceeded);
        assert_eq!(at.status, QuotaStatus::Exceeded);
        assert_eq!(at.percentage, Some(100));
        assert_eq!(at.remaining, Some(0));

        let below = QuotaUsage::classify(9, Some(10));
        assert!(!below.is_exceeded);
        assert_eq!(below.percentage, Some(90));
        assert_eq!(below.status, QuotaStatus::Warning);
    }

    #[test]
    fn test_percentage_rounds_and_may_exceed_100() {
        assert_eq!(QuotaUsage::classify(1, Some(3)).percentage, Some(33));
        assert_eq!(QuotaUsage::classify(2, Some(3)).percentage, Some(67));
        assert_eq!(QuotaUsage::classify(1, Some(8)).percentage, Some(13)); // 12.5
        assert_eq!(QuotaUsage::classify(30, Some(20)).percentage, Some(150));
    }

    #[test]
    fn test_status_follows_rounded_percentage() {
        let cases = [
            (694, 69, QuotaStatus::Ok),
            (695, 70, QuotaStatus::Warning),
            (944, 94, QuotaStatus::Warning),
            (945, 95, QuotaStatus::Critical),
            (994, 99, QuotaStatus::Critical),
            (995, 100, QuotaStatus::Exceeded),
        ];
        for (used, percentage, status) in cases {
            let usage = QuotaUsage::classify(used, Some(1000));
            assert_eq!(usage.percentage, Some(percentage), "{}", used);
            assert_eq!(usage.status, status, "{}", used);
        }
    }

    #[test]
    fn test_exceeded_flag_uses_raw_count() {
        // 99.5% reports exceeded but a unit of quota is still left
        let usage = QuotaUsage::classify(995, Some(1000));
        assert_eq!(usage.status, QuotaStatus::Exceeded);
        assert!(!usage.is_exceeded);
        assert_eq!(usage.remaining, Some(5));

        let catalog = standard_catalog().unwrap();
        let report = check_quota(&catalog, "api_calls", "pro", 249_000, None);
        assert_eq!(report.usage.percentage, Some(100));
        assert!(enforce_quota(&catalog, "api_calls", "pro", 249_000, None).is_ok());
    }

    #[test]
    fn test_unlimited_short_circuits() {
        let usage = QuotaUsage::classify(u64::MAX, None);
        assert_eq!(usage.status, QuotaStatus::Unlimited);
        assert!(!usage.is_exceeded);
        assert_eq!(usage.percentage, None);
        assert_eq!(usage.remaining, None);
    }

    #[test]
    fn test_zero_quota_is_exceeded() {
        let usage = QuotaUsage::classify(0, Some(0));
        assert!(usage.is_exceeded);
        assert_eq!(usage.status, QuotaStatus::Exceeded);
    }

    #[test]
    fn test_check_quota_with_override() {
        let catalog = standard_catalog().unwrap();
        let report = check_quota(&catalog, "campaigns", "starter", 8, Some(&QuotaOverride::limit(40)));
        assert_eq!(report.plan_quota, Some(10));
        assert!(report.override_applied);
        assert_eq!(report.usage.limit, Some(40));
        assert_eq!(report.usage.status, QuotaStatus::Ok);

        let report = check_quota(&catalog, "campaigns", "starter", 8, None);
        assert!(!report.override_applied);
        assert_eq!(report.usage.status, QuotaStatus::Warning);
    }

    #[test]
    fn test_enforce_quota() {
        let catalog = standard_catalog().unwrap();
        assert!(enforce_quota(&catalog, "webhooks", "pro", 49, None).is_ok());

        let err = enforce_quota(&catalog, "webhooks", "pro", 50, None).unwrap_err();
        assert_eq!(err.feature_key, "webhooks");
        assert_eq!(err.current_usage, 50);
        assert_eq!(err.quota, 50);
        assert_eq!(err.plan_slug, "pro");

        // Unlimited never fails
        assert!(enforce_quota(&catalog, "webhooks", "enterprise", u64::MAX, None).is_ok());
        assert!(enforce_quota(&catalog, "unknown_x", "free", 1_000_000, None).is_ok());
    }
}
