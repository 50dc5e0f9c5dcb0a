//! Feature resolution
//!
//! Answers "is this feature on for this tenant, and why?". Resolution order,
//! first match wins:
//!
//! 1. tenant override
//! 2. global override (from the context)
//! 3. plan membership (absent/unknown plan = free)
//! 4. global default flag table
//! 5. disabled
//!
//! Plan membership is checked before the global default table, so the table
//! only ever switches features *on* for plans that lack them.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use signdeck_shared::{Catalog, Feature, PlanSlug, TenantId};
use time::OffsetDateTime;

use crate::context::ResolutionContext;
use crate::error::FeatureNotEnabledError;
use crate::flags::GlobalFlags;
use crate::upgrade::minimum_plan_for_feature;

/// Which precedence tier decided a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    Override,
    GlobalOverride,
    Plan,
    Global,
    Default,
}

impl FeatureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSource::Override => "override",
            FeatureSource::GlobalOverride => "global_override",
            FeatureSource::Plan => "plan",
            FeatureSource::Global => "global",
            FeatureSource::Default => "default",
        }
    }
}

impl std::fmt::Display for FeatureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureResolution {
    pub enabled: bool,
    pub source: FeatureSource,
}

/// Outcome of checking several required features at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredFeaturesCheck {
    pub allowed: bool,
    /// Every disabled key, in input order
    pub missing: Vec<String>,
}

/// One resolved feature inside a source group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFeature {
    pub key: Feature,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSummary {
    pub total: usize,
    pub enabled: usize,
    pub from_plan: usize,
    pub from_global: usize,
}

/// Echo of the context a diagnostic was computed for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEcho {
    pub tenant_id: Option<TenantId>,
    pub plan: PlanSlug,
    pub tenant_overrides: HashMap<String, bool>,
    pub global_overrides: HashMap<String, bool>,
    pub has_overrides: bool,
}

/// Diagnostic view answering "why is each feature on or off?"
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveFeatures {
    pub by_source: BTreeMap<FeatureSource, Vec<ResolvedFeature>>,
    pub summary: FeatureSummary,
    pub context: ContextEcho,
    pub catalog_version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub computed_at: OffsetDateTime,
}

/// Resolves features against one catalog and one global flag table
#[derive(Debug, Clone, Copy)]
pub struct FeatureResolver<'a> {
    catalog: &'a Catalog,
    flags: &'a GlobalFlags,
}

impl<'a> FeatureResolver<'a> {
    pub fn new(catalog: &'a Catalog, flags: &'a GlobalFlags) -> Self {
        Self { catalog, flags }
    }

    /// Resolve a single feature key. Total: unknown keys resolve disabled.
    pub fn resolve_feature(&self, feature_key: &str, ctx: &ResolutionContext) -> FeatureResolution {
        let resolution = if let Some(&enabled) = ctx.tenant_overrides.get(feature_key) {
            FeatureResolution {
                enabled,
                source: FeatureSource::Override,
            }
        } else if let Some(&enabled) = ctx.global_overrides.get(feature_key) {
            FeatureResolution {
                enabled,
                source: FeatureSource::GlobalOverride,
            }
        } else if self
            .catalog
            .plan(ctx.plan_slug())
            .has_feature_key(feature_key)
        {
            FeatureResolution {
                enabled: true,
                source: FeatureSource::Plan,
            }
        } else if self.flags.is_enabled(feature_key) {
            FeatureResolution {
                enabled: true,
                source: FeatureSource::Global,
            }
        } else {
            FeatureResolution {
                enabled: false,
                source: FeatureSource::Default,
            }
        };

        tracing::debug!(
            feature_key,
            plan = %ctx.plan_slug(),
            enabled = resolution.enabled,
            source = %resolution.source,
            "feature resolved"
        );

        resolution
    }

    /// Resolve each requested key
    pub fn resolve_features<'k>(
        &self,
        feature_keys: impl IntoIterator<Item = &'k str>,
        ctx: &ResolutionContext,
    ) -> HashMap<String, FeatureResolution> {
        feature_keys
            .into_iter()
            .map(|key| (key.to_string(), self.resolve_feature(key, ctx)))
            .collect()
    }

    /// Resolve every known feature, in enumeration order
    pub fn resolve_all_features(&self, ctx: &ResolutionContext) -> BTreeMap<Feature, FeatureResolution> {
        Feature::ALL
            .into_iter()
            .map(|feature| (feature, self.resolve_feature(feature.key(), ctx)))
            .collect()
    }

    pub fn is_feature_resolved(&self, feature_key: &str, ctx: &ResolutionContext) -> bool {
        self.resolve_feature(feature_key, ctx).enabled
    }

    /// Enabled features in enumeration order (not sorted by name)
    pub fn enabled_features(&self, ctx: &ResolutionContext) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| self.is_feature_resolved(feature.key(), ctx))
            .collect()
    }

    /// Fail with [`FeatureNotEnabledError`] unless the feature resolves enabled
    pub fn require_feature(
        &self,
        feature_key: &str,
        ctx: &ResolutionContext,
    ) -> Result<(), FeatureNotEnabledError> {
        if self.is_feature_resolved(feature_key, ctx) {
            return Ok(());
        }

        let required_plan = minimum_plan_for_feature(self.catalog, feature_key);
        tracing::info!(
            feature_key,
            plan = %ctx.plan_slug(),
            tenant_id = ?ctx.tenant_id,
            required_plan = ?required_plan,
            "Feature not enabled"
        );
        Err(FeatureNotEnabledError::new(feature_key, required_plan))
    }

    /// Check several features without failing; reports every missing key
    pub fn check_required_features<'k>(
        &self,
        feature_keys: impl IntoIterator<Item = &'k str>,
        ctx: &ResolutionContext,
    ) -> RequiredFeaturesCheck {
        let missing: Vec<String> = feature_keys
            .into_iter()
            .filter(|key| !self.is_feature_resolved(key, ctx))
            .map(str::to_string)
            .collect();

        RequiredFeaturesCheck {
            allowed: missing.is_empty(),
            missing,
        }
    }

    /// Group every feature by the tier that decided it
    pub fn effective_features(&self, ctx: &ResolutionContext) -> EffectiveFeatures {
        let mut by_source: BTreeMap<FeatureSource, Vec<ResolvedFeature>> = BTreeMap::new();
        let mut summary = FeatureSummary::default();

        for (key, resolution) in self.resolve_all_features(ctx) {
            summary.total += 1;
            if resolution.enabled {
                summary.enabled += 1;
            }
            match resolution.source {
                FeatureSource::Plan => summary.from_plan += 1,
                FeatureSource::Global => summary.from_global += 1,
                _ => {}
            }
            by_source
                .entry(resolution.source)
                .or_default()
                .push(ResolvedFeature {
                    key,
                    enabled: resolution.enabled,
                });
        }

        EffectiveFeatures {
            by_source,
            summary,
            context: ContextEcho {
                tenant_id: ctx.tenant_id,
                plan: ctx.plan_slug(),
                tenant_overrides: ctx.tenant_overrides.clone(),
                global_overrides: ctx.global_overrides.clone(),
                has_overrides: ctx.has_overrides(),
            },
            catalog_version: self.catalog.version().to_string(),
            computed_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use signdeck_shared::standard_catalog;

    fn catalog() -> Catalog {
        standard_catalog().unwrap()
    }

    #[test]
    fn test_plan_membership_without_overrides() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);

        for plan in catalog.plans() {
            let ctx = ResolutionContext::for_plan(plan.slug.as_str());
            for feature in Feature::ALL {
                let resolution = resolver.resolve_feature(feature.key(), &ctx);
                let expected = plan.has_feature(feature);
                assert_eq!(resolution.enabled, expected, "{} on {}", feature, plan.slug);
                let source = if expected {
                    FeatureSource::Plan
                } else {
                    FeatureSource::Default
                };
                assert_eq!(resolution.source, source);
            }
        }
    }

    #[test]
    fn test_precedence_truth_table() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);

        // webhooks is in pro, not in starter
        for tenant in [None, Some(false), Some(true)] {
            for global in [None, Some(false), Some(true)] {
                for plan in ["starter", "pro"] {
                    let mut ctx = ResolutionContext::for_plan(plan);
                    if let Some(value) = tenant {
                        ctx = ctx.with_tenant_override("webhooks", value);
                    }
                    if let Some(value) = global {
                        ctx = ctx.with_global_override("webhooks", value);
                    }
                    let in_plan = plan == "pro";

                    let resolution = resolver.resolve_feature("webhooks", &ctx);
                    let expected = match (tenant, global) {
                        (Some(t), _) => (t, FeatureSource::Override),
                        (None, Some(g)) => (g, FeatureSource::GlobalOverride),
                        (None, None) if in_plan => (true, FeatureSource::Plan),
                        (None, None) => (false, FeatureSource::Default),
                    };
                    assert_eq!(
                        (resolution.enabled, resolution.source),
                        expected,
                        "tenant={:?} global={:?} plan={}",
                        tenant,
                        global,
                        plan
                    );
                }
            }
        }
    }

    #[test]
    fn test_tenant_override_can_disable_plan_feature() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("enterprise").with_tenant_override("sso", false);

        let resolution = resolver.resolve_feature("sso", &ctx);
        assert!(!resolution.enabled);
        assert_eq!(resolution.source, FeatureSource::Override);
    }

    #[test]
    fn test_plan_beats_global_default_flag() {
        let catalog = catalog();
        let flags = GlobalFlags::new()
            .with_flag("webhooks", false)
            .with_flag("sso", true);
        let resolver = FeatureResolver::new(&catalog, &flags);

        // A disabled default flag cannot remove a plan feature
        let pro = ResolutionContext::for_plan("pro");
        assert_eq!(
            resolver.resolve_feature("webhooks", &pro),
            FeatureResolution {
                enabled: true,
                source: FeatureSource::Plan
            }
        );

        // An enabled default flag turns on a feature the plan lacks
        assert_eq!(
            resolver.resolve_feature("sso", &pro),
            FeatureResolution {
                enabled: true,
                source: FeatureSource::Global
            }
        );
    }

    #[test]
    fn test_missing_or_unknown_plan_resolves_as_free() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);

        let no_plan = ResolutionContext::default();
        let bad_plan = ResolutionContext::for_plan("platinum");
        for ctx in [&no_plan, &bad_plan] {
            assert!(resolver.is_feature_resolved("screens", ctx));
            assert!(!resolver.is_feature_resolved("templates", ctx));
        }
    }

    #[test]
    fn test_unknown_feature_key() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("reseller");

        assert_eq!(
            resolver.resolve_feature("teleportation", &ctx),
            FeatureResolution {
                enabled: false,
                source: FeatureSource::Default
            }
        );

        // Overrides still apply to keys the catalog does not know
        let ctx = ctx.with_tenant_override("teleportation", true);
        assert!(resolver.is_feature_resolved("teleportation", &ctx));
    }

    #[test]
    fn test_resolve_features_keys_every_request() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("starter");

        let resolved = resolver.resolve_features(["templates", "sso", "nope"], &ctx);
        assert_eq!(resolved.len(), 3);
        assert!(resolved["templates"].enabled);
        assert!(!resolved["sso"].enabled);
        assert_eq!(resolved["nope"].source, FeatureSource::Default);
    }

    #[test]
    fn test_resolve_all_features_covers_catalog() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let all = resolver.resolve_all_features(&ResolutionContext::for_plan("pro"));
        assert_eq!(all.len(), Feature::ALL.len());
        assert!(all.keys().copied().eq(Feature::ALL));
    }

    #[test]
    fn test_enabled_features_in_enumeration_order() {
        let catalog = catalog();
        let flags = GlobalFlags::new().with_flag("sso", true);
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("free").with_tenant_override("templates", true);

        let enabled = resolver.enabled_features(&ctx);
        assert_eq!(
            enabled,
            vec![
                Feature::Screens,
                Feature::MediaLibrary,
                Feature::Playlists,
                Feature::BasicScheduling,
                Feature::Layouts,
                Feature::Widgets,
                Feature::Templates,
                Feature::BasicAnalytics,
                Feature::AiAssistant,
                Feature::Sso,
            ]
        );
    }

    #[test]
    fn test_require_feature() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("starter");

        assert!(resolver.require_feature("campaigns", &ctx).is_ok());

        let err = resolver.require_feature("webhooks", &ctx).unwrap_err();
        assert_eq!(err.code(), "FEATURE_NOT_ENABLED");
        assert_eq!(err.feature_key, "webhooks");
        assert_eq!(err.required_plan, Some(PlanSlug::Pro));

        let err = resolver.require_feature("unknown_x", &ctx).unwrap_err();
        assert_eq!(err.required_plan, None);
    }

    #[test]
    fn test_check_required_features_lists_all_missing_in_order() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("starter");

        let check = resolver.check_required_features(["sso", "templates", "webhooks", "white_label"], &ctx);
        assert!(!check.allowed);
        assert_eq!(check.missing, vec!["sso", "webhooks", "white_label"]);

        let check = resolver.check_required_features(["templates", "screens"], &ctx);
        assert!(check.allowed);
        assert!(check.missing.is_empty());
    }

    #[test]
    fn test_effective_features_summary() {
        let catalog = catalog();
        let flags = GlobalFlags::new().with_flag("sso", true);
        let resolver = FeatureResolver::new(&catalog, &flags);
        let ctx = ResolutionContext::for_plan("starter")
            .with_tenant_override("webhooks", true)
            .with_global_override("templates", false);

        let effective = resolver.effective_features(&ctx);
        let starter_features = catalog.plan(PlanSlug::Starter).features.len();

        assert_eq!(effective.summary.total, Feature::ALL.len());
        // templates is in starter but switched off by the global override
        assert_eq!(effective.summary.from_plan, starter_features - 1);
        assert_eq!(effective.summary.from_global, 1);
        assert_eq!(effective.summary.enabled, starter_features - 1 + 1 + 1);

        assert_eq!(
            effective.by_source[&FeatureSource::Override],
            vec![ResolvedFeature {
                key: Feature::Webhooks,
                enabled: true
            }]
        );
        assert_eq!(
            effective.by_source[&FeatureSource::GlobalOverride],
            vec![ResolvedFeature {
                key: Feature::Templates,
                enabled: false
            }]
        );
        assert!(effective.context.has_overrides);
        assert_eq!(effective.context.plan, PlanSlug::Starter);
        assert_eq!(effective.catalog_version, catalog.version());
    }

    #[test]
    fn test_effective_features_without_overrides() {
        let catalog = catalog();
        let flags = GlobalFlags::new();
        let resolver = FeatureResolver::new(&catalog, &flags);
        let effective = resolver.effective_features(&ResolutionContext::for_plan("pro"));

        assert!(!effective.context.has_overrides);
        assert!(!effective.by_source.contains_key(&FeatureSource::Override));
        assert_eq!(effective.summary.from_global, 0);
        assert_eq!(effective.summary.enabled, effective.summary.from_plan);
    }
}
