//! Error types for SignDeck catalog construction

use thiserror::Error;

use crate::types::{Feature, PlanSlug};

/// Reasons a plan catalog is rejected at load time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Plan defined more than once: {0}")]
    DuplicatePlan(PlanSlug),

    #[error("Plan missing from catalog: {0}")]
    MissingPlan(PlanSlug),

    #[error("Plan {plan} has rank {rank}, expected {expected}")]
    RankMismatch {
        plan: PlanSlug,
        rank: u8,
        expected: u8,
    },

    #[error("Upgrading from {lower} to {plan} adds no features")]
    NoFeatureGain { plan: PlanSlug, lower: PlanSlug },

    #[error("Plan {plan} is missing feature {feature} included in {lower}")]
    FeatureRegression {
        plan: PlanSlug,
        lower: PlanSlug,
        feature: Feature,
    },

    #[error("Quota declared for unmetered feature {feature} on plan {plan}")]
    UnmeteredQuota { plan: PlanSlug, feature: Feature },

    #[error("No quota entry for metered feature {feature} on plan {plan}")]
    MissingQuota { plan: PlanSlug, feature: Feature },

    #[error("Quota for {feature} does not increase from {lower} to {plan}")]
    QuotaNotIncreasing {
        feature: Feature,
        lower: PlanSlug,
        plan: PlanSlug,
    },

    #[error("Quota for {feature} must be unlimited on {plan}")]
    QuotaMustBeUnlimited { feature: Feature, plan: PlanSlug },

    #[error("Malformed catalog document: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Malformed(err.to_string())
    }
}
