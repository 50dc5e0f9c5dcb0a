//! The standard SignDeck plan catalog
//!
//! Free (2 screens) → Starter ($29) → Pro ($99) → Enterprise (sales) → Reseller (sales)

use crate::catalog::{Catalog, PlanDefinition};
use crate::error::CatalogError;
use crate::types::{Feature, LimitResource, PlanSlug};

pub const STANDARD_CATALOG_VERSION: &str = "2026.10";

/// Build the standard catalog
pub fn standard_catalog() -> Result<Catalog, CatalogError> {
    Catalog::builder(STANDARD_CATALOG_VERSION)
        .plan(free())
        .plan(starter())
        .plan(pro())
        .plan(enterprise())
        .plan(reseller())
        .build()
}

fn free() -> PlanDefinition {
    PlanDefinition::new(PlanSlug::Free, "Free")
        .description("Try SignDeck on a couple of screens")
        .display_order(1)
        .pricing(Some(0), Some(0))
        .features([
            Feature::Screens,
            Feature::MediaLibrary,
            Feature::Playlists,
            Feature::BasicScheduling,
            Feature::Layouts,
            Feature::Widgets,
            Feature::BasicAnalytics,
            Feature::AiAssistant,
        ])
        .limit(LimitResource::Screens, Some(2))
        .limit(LimitResource::MediaAssets, Some(50))
        .limit(LimitResource::StorageGb, Some(1))
        .limit(LimitResource::TeamMembers, Some(1))
        .limit(LimitResource::Playlists, Some(3))
        .quota(Feature::AiAssistant, Some(25))
        .quota(Feature::Campaigns, Some(0))
        .quota(Feature::AuditLogs, Some(0))
        .quota(Feature::ApiCalls, Some(0))
        .quota(Feature::ScreenGroups, Some(0))
        .quota(Feature::BulkOperations, Some(0))
        .quota(Feature::Webhooks, Some(0))
}

fn starter() -> PlanDefinition {
    PlanDefinition::new(PlanSlug::Starter, "Starter")
        .description("For small businesses running a handful of displays")
        .display_order(2)
        .pricing(Some(2_900), Some(29_000))
        .features([
            Feature::OfflinePlayback,
            Feature::Templates,
            Feature::DesignEditor,
            Feature::Campaigns,
            Feature::ScreenGroups,
            Feature::ProofOfPlay,
            Feature::AuditLogs,
            Feature::ApiCalls,
        ])
        .limit(LimitResource::Screens, Some(10))
        .limit(LimitResource::MediaAssets, Some(500))
        .limit(LimitResource::StorageGb, Some(10))
        .limit(LimitResource::TeamMembers, Some(5))
        .limit(LimitResource::Playlists, Some(25))
        .quota(Feature::AiAssistant, Some(250))
        .quota(Feature::Campaigns, Some(10))
        .quota(Feature::AuditLogs, Some(1_000))
        .quota(Feature::ApiCalls, Some(10_000))
        .quota(Feature::ScreenGroups, Some(5))
        .quota(Feature::BulkOperations, Some(10))
        .quota(Feature::Webhooks, Some(5))
}

fn pro() -> PlanDefinition {
    PlanDefinition::new(PlanSlug::Pro, "Pro")
        .description("For growing networks that need automation and insight")
        .display_order(3)
        .pricing(Some(9_900), Some(99_000))
        .features([
            Feature::AdvancedScheduling,
            Feature::BulkOperations,
            Feature::AdvancedAnalytics,
            Feature::AiContentGeneration,
            Feature::Webhooks,
            Feature::CustomRoles,
            Feature::PrioritySupport,
        ])
        .limit(LimitResource::Screens, Some(50))
        .limit(LimitResource::MediaAssets, Some(5_000))
        .limit(LimitResource::StorageGb, Some(100))
        .limit(LimitResource::TeamMembers, Some(25))
        .limit(LimitResource::Playlists, None)
        .quota(Feature::AiAssistant, Some(2_500))
        .quota(Feature::Campaigns, Some(100))
        .quota(Feature::AuditLogs, Some(50_000))
        .quota(Feature::ApiCalls, Some(250_000))
        .quota(Feature::ScreenGroups, Some(50))
        .quota(Feature::BulkOperations, Some(500))
        .quota(Feature::Webhooks, Some(50))
}

fn enterprise() -> PlanDefinition {
    unlimited(
        PlanDefinition::new(PlanSlug::Enterprise, "Enterprise")
            .description("Unlimited scale with security and compliance controls")
            .display_order(4)
            .pricing(None, None)
            .features([
                Feature::Sso,
                Feature::IpAllowlist,
                Feature::CustomDomain,
                Feature::WhiteLabel,
                Feature::DedicatedAccountManager,
            ]),
    )
}

fn reseller() -> PlanDefinition {
    unlimited(
        PlanDefinition::new(PlanSlug::Reseller, "Reseller")
            .description("Resell SignDeck to your own customers")
            .display_order(5)
            .pricing(None, None)
            .features([
                Feature::ResellerPortal,
                Feature::SubAccounts,
                Feature::ResellerBilling,
            ]),
    )
}

/// No resource caps and no metered quotas
fn unlimited(definition: PlanDefinition) -> PlanDefinition {
    let definition = LimitResource::ALL
        .into_iter()
        .fold(definition, |def, resource| def.limit(resource, None));
    Feature::METERED
        .into_iter()
        .fold(definition, |def, feature| def.quota(feature, None))
}
