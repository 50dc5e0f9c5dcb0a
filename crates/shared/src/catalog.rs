//! Plan catalog
//!
//! The catalog is the one definition of plans, feature membership, resource
//! limits and metered quotas. Server-side handlers resolve against it directly
//! and clients receive the same value serialized as JSON, so both sides always
//! agree on every (feature, plan) pair.
//!
//! ## Invariants (checked on every construction path)
//!
//! 1. Every [`PlanSlug`] appears exactly once, with `rank == slug.rank()`.
//! 2. Each plan's feature set is a strict superset of the plan below it.
//! 3. Every metered feature has a quota entry on every plan; finite quotas
//!    strictly increase with rank and never return from unlimited.
//! 4. Enterprise and reseller quotas are unlimited.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::types::{Feature, LimitResource, PlanSlug};

/// Plans whose metered quotas are unlimited by convention
pub const UNLIMITED_QUOTA_PLANS: [PlanSlug; 2] = [PlanSlug::Enterprise, PlanSlug::Reseller];

/// A subscription plan as published in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub slug: PlanSlug,
    pub name: String,
    pub description: String,
    pub rank: u8,
    /// Position on pricing pages (ascending)
    pub display_order: u32,
    /// Every feature this plan includes, lower tiers' features included
    pub features: BTreeSet<Feature>,
    /// Resource caps. `None` = unlimited
    pub limits: BTreeMap<LimitResource, Option<u64>>,
    /// Monthly quotas for metered features. `None` = unlimited
    pub quotas: BTreeMap<Feature, Option<u64>>,
    /// `None` = contact sales
    pub monthly_price_cents: Option<u32>,
    pub yearly_price_cents: Option<u32>,
}

impl Plan {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Membership check by raw key. Unknown keys are never included.
    pub fn has_feature_key(&self, key: &str) -> bool {
        key.parse::<Feature>()
            .map(|f| self.has_feature(f))
            .unwrap_or(false)
    }

    /// Resource limit, `None` when unlimited or not declared
    pub fn limit(&self, resource: LimitResource) -> Option<u64> {
        self.limits.get(&resource).copied().flatten()
    }

    /// Quota for a metered feature, `None` when unlimited or not metered
    pub fn quota(&self, feature: Feature) -> Option<u64> {
        self.quotas.get(&feature).copied().flatten()
    }

    /// Plans without a list price are sold through sales
    pub fn is_custom_priced(&self) -> bool {
        self.monthly_price_cents.is_none()
    }
}

/// Declarative description of one plan, consumed by [`CatalogBuilder`].
///
/// A definition lists only the features the plan *adds*; the builder unions
/// them with every lower tier, which is what keeps feature sets monotonic.
#[derive(Debug, Clone)]
pub struct PlanDefinition {
    slug: PlanSlug,
    name: String,
    description: String,
    display_order: Option<u32>,
    adds: Vec<Feature>,
    limits: BTreeMap<LimitResource, Option<u64>>,
    quotas: BTreeMap<Feature, Option<u64>>,
    monthly_price_cents: Option<u32>,
    yearly_price_cents: Option<u32>,
}

impl PlanDefinition {
    pub fn new(slug: PlanSlug, name: impl Into<String>) -> Self {
        Self {
            slug,
            name: name.into(),
            description: String::new(),
            display_order: None,
            adds: Vec::new(),
            limits: BTreeMap::new(),
            quotas: BTreeMap::new(),
            monthly_price_cents: None,
            yearly_price_cents: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Defaults to `rank + 1`
    pub fn display_order(mut self, order: u32) -> Self {
        self.display_order = Some(order);
        self
    }

    /// Features added on top of the tier below
    pub fn features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.adds.extend(features);
        self
    }

    pub fn limit(mut self, resource: LimitResource, value: Option<u64>) -> Self {
        self.limits.insert(resource, value);
        self
    }

    pub fn quota(mut self, feature: Feature, value: Option<u64>) -> Self {
        self.quotas.insert(feature, value);
        self
    }

    pub fn pricing(mut self, monthly_cents: Option<u32>, yearly_cents: Option<u32>) -> Self {
        self.monthly_price_cents = monthly_cents;
        self.yearly_price_cents = yearly_cents;
        self
    }
}

/// Builder that assembles and validates a [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    version: String,
    definitions: Vec<PlanDefinition>,
}

impl CatalogBuilder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            definitions: Vec::new(),
        }
    }

    pub fn plan(mut self, definition: PlanDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut ordered = Vec::with_capacity(PlanSlug::ALL.len());
        for slug in PlanSlug::ALL {
            let mut matching = self.definitions.iter().filter(|d| d.slug == slug);
            let definition = matching.next().ok_or(CatalogError::MissingPlan(slug))?;
            if matching.next().is_some() {
                return Err(CatalogError::DuplicatePlan(slug));
            }
            ordered.push(definition);
        }

        let mut inherited = BTreeSet::new();
        let mut plans = Vec::with_capacity(ordered.len());
        for definition in ordered {
            inherited.extend(definition.adds.iter().copied());
            let rank = definition.slug.rank();
            plans.push(Plan {
                slug: definition.slug,
                name: definition.name.clone(),
                description: definition.description.clone(),
                rank,
                display_order: definition.display_order.unwrap_or(u32::from(rank) + 1),
                features: inherited.clone(),
                limits: definition.limits.clone(),
                quotas: definition.quotas.clone(),
                monthly_price_cents: definition.monthly_price_cents,
                yearly_price_cents: definition.yearly_price_cents,
            });
        }

        Catalog::from_plans(self.version, plans)
    }
}

/// Versioned, validated set of plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogDocument")]
pub struct Catalog {
    version: String,
    plans: Vec<Plan>,
}

/// Unvalidated wire form of a catalog
#[derive(Deserialize)]
struct CatalogDocument {
    version: String,
    plans: Vec<Plan>,
}

impl TryFrom<CatalogDocument> for Catalog {
    type Error = CatalogError;

    fn try_from(doc: CatalogDocument) -> Result<Self, Self::Error> {
        Catalog::from_plans(doc.version, doc.plans)
    }
}

impl Catalog {
    pub fn builder(version: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder::new(version)
    }

    /// Validate fully-expanded plans. Input order does not matter.
    pub fn from_plans(version: impl Into<String>, mut plans: Vec<Plan>) -> Result<Self, CatalogError> {
        for slug in PlanSlug::ALL {
            match plans.iter().filter(|p| p.slug == slug).count() {
                0 => return Err(CatalogError::MissingPlan(slug)),
                1 => {}
                _ => return Err(CatalogError::DuplicatePlan(slug)),
            }
        }
        plans.sort_by_key(|p| p.slug.rank());

        for plan in &plans {
            if plan.rank != plan.slug.rank() {
                return Err(CatalogError::RankMismatch {
                    plan: plan.slug,
                    rank: plan.rank,
                    expected: plan.slug.rank(),
                });
            }
        }

        validate_feature_monotonicity(&plans)?;
        validate_quotas(&plans)?;

        Ok(Self {
            version: version.into(),
            plans,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// All plans in ascending rank order
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan(&self, slug: PlanSlug) -> &Plan {
        // Construction guarantees plans[rank] has that rank
        &self.plans[slug.rank() as usize]
    }

    /// Look up a plan by raw slug, falling back to free when unrecognized
    pub fn plan_or_free(&self, slug: &str) -> &Plan {
        self.plan(PlanSlug::from_str_lossy(slug))
    }
}

fn validate_feature_monotonicity(plans: &[Plan]) -> Result<(), CatalogError> {
    for pair in plans.windows(2) {
        let (lower, plan) = (&pair[0], &pair[1]);
        if let Some(feature) = lower.features.difference(&plan.features).next() {
            return Err(CatalogError::FeatureRegression {
                plan: plan.slug,
                lower: lower.slug,
                feature: *feature,
            });
        }
        if plan.features.len() == lower.features.len() {
            return Err(CatalogError::NoFeatureGain {
                plan: plan.slug,
                lower: lower.slug,
            });
        }
    }
    Ok(())
}

fn validate_quotas(plans: &[Plan]) -> Result<(), CatalogError> {
    for plan in plans {
        if let Some(feature) = plan.quotas.keys().find(|f| !f.is_metered()) {
            return Err(CatalogError::UnmeteredQuota {
                plan: plan.slug,
                feature: *feature,
            });
        }
    }

    for feature in Feature::METERED {
        let mut previous: Option<(PlanSlug, Option<u64>)> = None;
        for plan in plans {
            let quota = *plan
                .quotas
                .get(&feature)
                .ok_or(CatalogError::MissingQuota {
                    plan: plan.slug,
                    feature,
                })?;

            if UNLIMITED_QUOTA_PLANS.contains(&plan.slug) && quota.is_some() {
                return Err(CatalogError::QuotaMustBeUnlimited {
                    feature,
                    plan: plan.slug,
                });
            }

            if let Some((lower, lower_quota)) = previous {
                let increasing = match (lower_quota, quota) {
                    (Some(a), Some(b)) => b > a,
                    (Some(_), None) | (None, None) => true,
                    (None, Some(_)) => false,
                };
                if !increasing {
                    return Err(CatalogError::QuotaNotIncreasing {
                        feature,
                        lower,
                        plan: plan.slug,
                    });
                }
            }
            previous = Some((plan.slug, quota));
        }
    }
    Ok(())
}
