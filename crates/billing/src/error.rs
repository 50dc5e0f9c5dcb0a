//! Billing error types

use serde::Serialize;
use signdeck_shared::{CatalogError, Feature, PlanSlug};
use thiserror::Error;

/// A gated operation was attempted on a feature that resolved disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Feature '{feature_key}' is not enabled for this account")]
pub struct FeatureNotEnabledError {
    pub feature_key: String,
    /// Cheapest plan that includes the feature, when one exists
    pub required_plan: Option<PlanSlug>,
}

impl FeatureNotEnabledError {
    pub const CODE: &'static str = "FEATURE_NOT_ENABLED";
    pub const STATUS_CODE: u16 = 403;

    pub fn new(feature_key: impl Into<String>, required_plan: Option<PlanSlug>) -> Self {
        Self {
            feature_key: feature_key.into(),
            required_plan,
        }
    }

    pub fn code(&self) -> &'static str {
        Self::CODE
    }

    pub fn status_code(&self) -> u16 {
        Self::STATUS_CODE
    }
}

/// Usage of a metered feature reached its quota.
///
/// Built by callers after comparing usage to the resolved quota; carries every
/// input verbatim so handlers can render a precise upgrade prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct QuotaExceededError {
    pub feature_key: String,
    pub current_usage: u64,
    pub quota: u64,
    pub plan_slug: String,
    message: String,
}

impl QuotaExceededError {
    pub const CODE: &'static str = "QUOTA_EXCEEDED";
    pub const STATUS_CODE: u16 = 429;

    pub fn new(
        feature_key: impl Into<String>,
        current_usage: u64,
        quota: u64,
        plan_slug: impl Into<String>,
    ) -> Self {
        let feature_key = feature_key.into();
        let plan_slug = plan_slug.into();

        let feature_name = feature_key
            .parse::<Feature>()
            .map(|f| f.display_name().to_string())
            .unwrap_or_else(|_| feature_key.clone());

        // Unknown slugs are treated as free, so they always get the upgrade prompt
        let plan = PlanSlug::from_str_lossy(&plan_slug);
        let call_to_action = match plan.next() {
            Some(next) => format!("Upgrade to {} for a higher limit.", next.label()),
            None => "Contact support to raise this limit.".to_string(),
        };

        let message = format!(
            "Monthly {} quota reached ({}/{}) on the {} plan. {}",
            feature_name,
            current_usage,
            quota,
            plan.label(),
            call_to_action
        );

        Self {
            feature_key,
            current_usage,
            quota,
            plan_slug,
            message,
        }
    }

    pub fn code(&self) -> &'static str {
        Self::CODE
    }

    pub fn status_code(&self) -> u16 {
        Self::STATUS_CODE
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Billing-specific errors
#[derive(Debug, Error)]
pub enum BillingError {
    #[error(transparent)]
    FeatureNotEnabled(#[from] FeatureNotEnabledError),

    #[error(transparent)]
    QuotaExceeded(#[from] QuotaExceededError),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BillingError {
    /// HTTP status a handler should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            BillingError::FeatureNotEnabled(e) => e.status_code(),
            BillingError::QuotaExceeded(e) => e.status_code(),
            BillingError::InvalidCatalog(_) | BillingError::InvalidInput(_) => 400,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BillingError::FeatureNotEnabled(e) => e.code(),
            BillingError::QuotaExceeded(e) => e.code(),
            BillingError::InvalidCatalog(_) => "INVALID_CATALOG",
            BillingError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
