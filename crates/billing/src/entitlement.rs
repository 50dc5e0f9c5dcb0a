//! Entitlement Module
//!
//! Provides a unified view of what a tenant can do based on their plan.
//! This module answers the question: "What features/limits does this tenant have right now?"
//!
//! ## Design Principles
//!
//! 1. **Single Source of Truth**: every answer comes from one [`EntitlementSnapshot`]
//! 2. **Deterministic**: same snapshot and context always produce the same output
//! 3. **Atomic updates**: new catalogs or flag tables replace the whole snapshot,
//!    so concurrent readers never observe a half-applied change

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use signdeck_shared::{Catalog, Feature, LimitResource, PlanSlug, TenantId};
use time::OffsetDateTime;

use crate::context::ResolutionContext;
use crate::error::QuotaExceededError;
use crate::features::FeatureResolver;
use crate::flags::GlobalFlags;
use crate::quota::{self, QuotaReport};

/// Immutable (catalog, flags) pair with a version stamp
#[derive(Debug)]
pub struct EntitlementSnapshot {
    version: u64,
    catalog: Catalog,
    flags: GlobalFlags,
    loaded_at: OffsetDateTime,
}

impl EntitlementSnapshot {
    pub fn new(version: u64, catalog: Catalog, flags: GlobalFlags) -> Self {
        Self {
            version,
            catalog,
            flags,
            loaded_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn flags(&self) -> &GlobalFlags {
        &self.flags
    }

    pub fn loaded_at(&self) -> OffsetDateTime {
        self.loaded_at
    }

    pub fn features(&self) -> FeatureResolver<'_> {
        FeatureResolver::new(&self.catalog, &self.flags)
    }

    /// Plan quota with the context's override for that feature applied
    pub fn effective_quota(&self, feature_key: &str, ctx: &ResolutionContext) -> Option<u64> {
        quota::apply_quota_override(
            quota::quota_for_feature(&self.catalog, feature_key, ctx.plan_str()),
            ctx.quota_overrides.get(feature_key),
        )
    }

    pub fn check_quota(&self, feature_key: &str, used: u64, ctx: &ResolutionContext) -> QuotaReport {
        quota::check_quota(
            &self.catalog,
            feature_key,
            ctx.plan_str(),
            used,
            ctx.quota_overrides.get(feature_key),
        )
    }

    /// Like [`check_quota`](Self::check_quota), but fails once usage has reached the quota
    pub fn enforce_quota(
        &self,
        feature_key: &str,
        used: u64,
        ctx: &ResolutionContext,
    ) -> Result<QuotaReport, QuotaExceededError> {
        quota::enforce_quota(
            &self.catalog,
            feature_key,
            ctx.plan_str(),
            used,
            ctx.quota_overrides.get(feature_key),
        )
    }

    /// Compute the complete entitlement for a tenant.
    /// This is THE function that answers "what can this tenant do?"
    pub fn compute_entitlement(&self, ctx: &ResolutionContext) -> Entitlement {
        let plan = self.catalog.plan(ctx.plan_slug());
        let quotas = Feature::METERED
            .into_iter()
            .map(|feature| (feature, self.effective_quota(feature.key(), ctx)))
            .collect();

        Entitlement {
            tenant_id: ctx.tenant_id,
            plan: plan.slug,
            plan_name: plan.name.clone(),
            features: self.features().enabled_features(ctx),
            limits: plan.limits.clone(),
            quotas,
            has_overrides: ctx.has_overrides(),
            snapshot_version: self.version,
            catalog_version: self.catalog.version().to_string(),
            computed_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Complete entitlement information for a tenant
#[derive(Debug, Clone, Serialize)]
pub struct Entitlement {
    pub tenant_id: Option<TenantId>,
    pub plan: PlanSlug,
    pub plan_name: String,
    /// Enabled features, enumeration order
    pub features: Vec<Feature>,
    /// Resource caps for the plan (`None` = unlimited)
    pub limits: BTreeMap<LimitResource, Option<u64>>,
    /// Effective quotas for metered features, overrides applied (`None` = unlimited)
    pub quotas: BTreeMap<Feature, Option<u64>>,
    pub has_overrides: bool,
    pub snapshot_version: u64,
    pub catalog_version: String,
    /// When this entitlement was computed
    #[serde(with = "time::serde::rfc3339")]
    pub computed_at: OffsetDateTime,
}

impl Entitlement {
    /// Check if a specific feature is enabled
    pub fn has_feature(&self, feature_key: &str) -> bool {
        feature_key
            .parse::<Feature>()
            .map(|f| self.features.contains(&f))
            .unwrap_or(false)
    }

    /// Effective quota, `None` when unlimited or not metered
    pub fn quota(&self, feature: Feature) -> Option<u64> {
        self.quotas.get(&feature).copied().flatten()
    }
}

/// Entitlement service holding the current snapshot
pub struct EntitlementService {
    current: RwLock<Arc<EntitlementSnapshot>>,
}

impl EntitlementService {
    pub fn new(catalog: Catalog, flags: GlobalFlags) -> Self {
        tracing::info!(
            catalog_version = catalog.version(),
            global_flags = flags.len(),
            "Entitlement snapshot loaded"
        );
        Self {
            current: RwLock::new(Arc::new(EntitlementSnapshot::new(1, catalog, flags))),
        }
    }

    /// Current snapshot. Holders keep resolving against it even after a swap.
    pub fn snapshot(&self) -> Arc<EntitlementSnapshot> {
        // A poisoned lock still holds a complete Arc: writers only ever assign
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the global default flags, keeping the catalog. Returns the new version.
    pub fn replace_flags(&self, flags: GlobalFlags) -> u64 {
        self.swap(|current| EntitlementSnapshot::new(current.version + 1, current.catalog.clone(), flags))
    }

    /// Replace the catalog, keeping the flags. Returns the new version.
    pub fn replace_catalog(&self, catalog: Catalog) -> u64 {
        self.swap(|current| EntitlementSnapshot::new(current.version + 1, catalog, current.flags.clone()))
    }

    fn swap(&self, build: impl FnOnce(&EntitlementSnapshot) -> EntitlementSnapshot) -> u64 {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = Arc::new(build(&guard));
        let version = next.version;
        *guard = next;

        tracing::info!(
            version,
            catalog_version = guard.catalog.version(),
            global_flags = guard.flags.len(),
            "Entitlement snapshot replaced"
        );
        version
    }

    /// Convenience: resolve against the current snapshot
    pub fn compute_entitlement(&self, ctx: &ResolutionContext) -> Entitlement {
        self.snapshot().compute_entitlement(ctx)
    }
}

impl std::fmt::Debug for EntitlementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementService")
            .field("version", &self.snapshot().version())
            .finish()
    }
}
