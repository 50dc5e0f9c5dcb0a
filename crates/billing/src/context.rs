//! Per-request resolution input

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use signdeck_shared::{PlanSlug, TenantId};

use crate::quota::QuotaOverride;

/// Everything that varies per request when resolving features and quotas.
///
/// Built by the caller from the tenant record; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionContext {
    /// Only used for log correlation
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// Raw plan slug. Absent or unrecognized resolves as free.
    #[serde(default)]
    pub plan: Option<String>,
    /// Per-tenant feature switches, highest precedence
    #[serde(default)]
    pub tenant_overrides: HashMap<String, bool>,
    /// Platform-wide feature switches, second precedence
    #[serde(default)]
    pub global_overrides: HashMap<String, bool>,
    /// Per-feature quota overrides
    #[serde(default)]
    pub quota_overrides: HashMap<String, QuotaOverride>,
}

impl ResolutionContext {
    pub fn for_plan(plan: impl Into<String>) -> Self {
        Self {
            plan: Some(plan.into()),
            ..Self::default()
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_tenant_override(mut self, feature_key: impl Into<String>, enabled: bool) -> Self {
        self.tenant_overrides.insert(feature_key.into(), enabled);
        self
    }

    pub fn with_global_override(mut self, feature_key: impl Into<String>, enabled: bool) -> Self {
        self.global_overrides.insert(feature_key.into(), enabled);
        self
    }

    pub fn with_quota_override(
        mut self,
        feature_key: impl Into<String>,
        quota_override: QuotaOverride,
    ) -> Self {
        self.quota_overrides.insert(feature_key.into(), quota_override);
        self
    }

    /// Effective plan, free when absent or unrecognized
    pub fn plan_slug(&self) -> PlanSlug {
        self.plan
            .as_deref()
            .map(PlanSlug::from_str_lossy)
            .unwrap_or_default()
    }

    /// Raw plan string for quota lookups (empty resolves as free)
    pub fn plan_str(&self) -> &str {
        self.plan.as_deref().unwrap_or("")
    }

    /// True iff the tenant has any per-feature override
    pub fn has_overrides(&self) -> bool {
        !self.tenant_overrides.is_empty()
    }
}
