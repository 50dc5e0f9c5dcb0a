//! SignDeck Billing
//!
//! Plan, feature and quota resolution for SignDeck tenants. Every resolver is
//! a pure function of a [`Catalog`](signdeck_shared::Catalog), the global
//! default-flag table and a caller-supplied [`ResolutionContext`].

pub mod context;
pub mod entitlement;
pub mod error;
pub mod features;
pub mod flags;
pub mod plans;
pub mod quota;
pub mod upgrade;

pub use context::ResolutionContext;
pub use entitlement::{Entitlement, EntitlementService, EntitlementSnapshot};
pub use error::{BillingError, BillingResult, FeatureNotEnabledError, QuotaExceededError};
pub use features::{
    EffectiveFeatures, FeatureResolution, FeatureResolver, FeatureSource, RequiredFeaturesCheck,
};
pub use flags::GlobalFlags;
pub use plans::{format_plan_price, ResourceLimitCheck};
pub use quota::{QuotaOverride, QuotaReport, QuotaStatus, QuotaUsage};
pub use upgrade::{compare_plans, is_plan_at_least, UpgradePath};
