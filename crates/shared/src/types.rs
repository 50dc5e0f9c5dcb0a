//! Common types used across SignDeck

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Plans
// =============================================================================

/// Subscription plan tier, in ascending rank order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanSlug {
    #[default]
    Free,
    Starter,
    Pro,
    Enterprise,
    Reseller,
}

impl PlanSlug {
    /// Every plan, lowest rank first
    pub const ALL: [PlanSlug; 5] = [
        Self::Free,
        Self::Starter,
        Self::Pro,
        Self::Enterprise,
        Self::Reseller,
    ];

    /// Dense ordinal rank (0 = free). Plan comparison is rank subtraction.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Starter => 1,
            Self::Pro => 2,
            Self::Enterprise => 3,
            Self::Reseller => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
            Self::Reseller => "reseller",
        }
    }

    /// Human-facing plan label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Starter => "Starter",
            Self::Pro => "Pro",
            Self::Enterprise => "Enterprise",
            Self::Reseller => "Reseller",
        }
    }

    /// The next tier up, if any
    pub fn next(&self) -> Option<PlanSlug> {
        Self::ALL.get(self.rank() as usize + 1).copied()
    }

    pub fn is_top_tier(&self) -> bool {
        self.next().is_none()
    }

    /// Parse a plan slug, falling back to Free for anything unrecognized
    pub fn from_str_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for PlanSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            "reseller" => Ok(Self::Reseller),
            _ => Err(format!("Invalid plan slug: {}", s)),
        }
    }
}

/// Billing cadence used when rendering prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingCadence {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCadence {
    /// Price suffix, e.g. `/mo`
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Monthly => "/mo",
            Self::Yearly => "/year",
        }
    }
}

impl std::str::FromStr for BillingCadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "annual" | "year" => Ok(Self::Yearly),
            _ => Err(format!("Invalid billing cadence: {}", s)),
        }
    }
}

/// Countable resources capped by plan limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitResource {
    Screens,
    MediaAssets,
    StorageGb,
    TeamMembers,
    Playlists,
}

impl LimitResource {
    pub const ALL: [LimitResource; 5] = [
        Self::Screens,
        Self::MediaAssets,
        Self::StorageGb,
        Self::TeamMembers,
        Self::Playlists,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screens => "screens",
            Self::MediaAssets => "media_assets",
            Self::StorageGb => "storage_gb",
            Self::TeamMembers => "team_members",
            Self::Playlists => "playlists",
        }
    }
}

impl std::fmt::Display for LimitResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LimitResource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Invalid limit resource: {}", s))
    }
}

// =============================================================================
// Features
// =============================================================================

/// Category tag used to group features on pricing and settings pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Core,
    Content,
    Scheduling,
    Analytics,
    Ai,
    Integrations,
    Security,
    Branding,
    Support,
    Reseller,
}

impl FeatureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Content => "content",
            Self::Scheduling => "scheduling",
            Self::Analytics => "analytics",
            Self::Ai => "ai",
            Self::Integrations => "integrations",
            Self::Security => "security",
            Self::Branding => "branding",
            Self::Support => "support",
            Self::Reseller => "reseller",
        }
    }
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boolean-gated capability, identified by a stable snake_case key.
///
/// Declaration order is the canonical enumeration order: listings that
/// report "every feature" walk [`Feature::ALL`] and never sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Screens,
    MediaLibrary,
    Playlists,
    BasicScheduling,
    Layouts,
    OfflinePlayback,
    Widgets,
    Templates,
    DesignEditor,
    Campaigns,
    ScreenGroups,
    AdvancedScheduling,
    BulkOperations,
    BasicAnalytics,
    ProofOfPlay,
    AdvancedAnalytics,
    AuditLogs,
    AiAssistant,
    AiContentGeneration,
    ApiCalls,
    Webhooks,
    CustomRoles,
    Sso,
    IpAllowlist,
    CustomDomain,
    WhiteLabel,
    PrioritySupport,
    DedicatedAccountManager,
    ResellerPortal,
    SubAccounts,
    ResellerBilling,
}

impl Feature {
    pub const ALL: [Feature; 31] = [
        Self::Screens,
        Self::MediaLibrary,
        Self::Playlists,
        Self::BasicScheduling,
        Self::Layouts,
        Self::OfflinePlayback,
        Self::Widgets,
        Self::Templates,
        Self::DesignEditor,
        Self::Campaigns,
        Self::ScreenGroups,
        Self::AdvancedScheduling,
        Self::BulkOperations,
        Self::BasicAnalytics,
        Self::ProofOfPlay,
        Self::AdvancedAnalytics,
        Self::AuditLogs,
        Self::AiAssistant,
        Self::AiContentGeneration,
        Self::ApiCalls,
        Self::Webhooks,
        Self::CustomRoles,
        Self::Sso,
        Self::IpAllowlist,
        Self::CustomDomain,
        Self::WhiteLabel,
        Self::PrioritySupport,
        Self::DedicatedAccountManager,
        Self::ResellerPortal,
        Self::SubAccounts,
        Self::ResellerBilling,
    ];

    /// Features with a monthly usage ceiling
    pub const METERED: [Feature; 7] = [
        Self::AiAssistant,
        Self::Campaigns,
        Self::AuditLogs,
        Self::ApiCalls,
        Self::ScreenGroups,
        Self::BulkOperations,
        Self::Webhooks,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Screens => "screens",
            Self::MediaLibrary => "media_library",
            Self::Playlists => "playlists",
            Self::BasicScheduling => "basic_scheduling",
            Self::Layouts => "layouts",
            Self::OfflinePlayback => "offline_playback",
            Self::Widgets => "widgets",
            Self::Templates => "templates",
            Self::DesignEditor => "design_editor",
            Self::Campaigns => "campaigns",
            Self::ScreenGroups => "screen_groups",
            Self::AdvancedScheduling => "advanced_scheduling",
            Self::BulkOperations => "bulk_operations",
            Self::BasicAnalytics => "basic_analytics",
            Self::ProofOfPlay => "proof_of_play",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::AuditLogs => "audit_logs",
            Self::AiAssistant => "ai_assistant",
            Self::AiContentGeneration => "ai_content_generation",
            Self::ApiCalls => "api_calls",
            Self::Webhooks => "webhooks",
            Self::CustomRoles => "custom_roles",
            Self::Sso => "sso",
            Self::IpAllowlist => "ip_allowlist",
            Self::CustomDomain => "custom_domain",
            Self::WhiteLabel => "white_label",
            Self::PrioritySupport => "priority_support",
            Self::DedicatedAccountManager => "dedicated_account_manager",
            Self::ResellerPortal => "reseller_portal",
            Self::SubAccounts => "sub_accounts",
            Self::ResellerBilling => "reseller_billing",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Screens => "Screens",
            Self::MediaLibrary => "Media Library",
            Self::Playlists => "Playlists",
            Self::BasicScheduling => "Basic Scheduling",
            Self::Layouts => "Multi-Zone Layouts",
            Self::OfflinePlayback => "Offline Playback",
            Self::Widgets => "Widgets",
            Self::Templates => "Templates",
            Self::DesignEditor => "Design Editor",
            Self::Campaigns => "Campaigns",
            Self::ScreenGroups => "Screen Groups",
            Self::AdvancedScheduling => "Advanced Scheduling",
            Self::BulkOperations => "Bulk Operations",
            Self::BasicAnalytics => "Basic Analytics",
            Self::ProofOfPlay => "Proof of Play",
            Self::AdvancedAnalytics => "Advanced Analytics",
            Self::AuditLogs => "Audit Logs",
            Self::AiAssistant => "AI Assistant",
            Self::AiContentGeneration => "AI Content Generation",
            Self::ApiCalls => "API Access",
            Self::Webhooks => "Webhooks",
            Self::CustomRoles => "Custom Roles",
            Self::Sso => "Single Sign-On",
            Self::IpAllowlist => "IP Allowlist",
            Self::CustomDomain => "Custom Domain",
            Self::WhiteLabel => "White Label",
            Self::PrioritySupport => "Priority Support",
            Self::DedicatedAccountManager => "Dedicated Account Manager",
            Self::ResellerPortal => "Reseller Portal",
            Self::SubAccounts => "Sub-Accounts",
            Self::ResellerBilling => "Reseller Billing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Screens => "Pair and manage display screens",
            Self::MediaLibrary => "Upload images, video and documents",
            Self::Playlists => "Sequence media into rotating playlists",
            Self::BasicScheduling => "Schedule playlists by day and time",
            Self::Layouts => "Split screens into independent zones",
            Self::OfflinePlayback => "Cache content on devices for offline playback",
            Self::Widgets => "Clock, date and weather widgets",
            Self::Templates => "Start from ready-made scene templates",
            Self::DesignEditor => "Create content in the built-in editor",
            Self::Campaigns => "Run time-boxed content campaigns",
            Self::ScreenGroups => "Target content at groups of screens",
            Self::AdvancedScheduling => "Dayparting, priorities and recurrence rules",
            Self::BulkOperations => "Apply changes to many screens at once",
            Self::BasicAnalytics => "Screen uptime and playback summaries",
            Self::ProofOfPlay => "Per-item playback reports",
            Self::AdvancedAnalytics => "Audience and engagement dashboards",
            Self::AuditLogs => "Record who changed what and when",
            Self::AiAssistant => "Ask the assistant to draft playlists and copy",
            Self::AiContentGeneration => "Generate images and scenes with AI",
            Self::ApiCalls => "Programmatic access to the REST API",
            Self::Webhooks => "Push events to external systems",
            Self::CustomRoles => "Define fine-grained team roles",
            Self::Sso => "SAML and OIDC single sign-on",
            Self::IpAllowlist => "Restrict console access by IP range",
            Self::CustomDomain => "Serve the console from your own domain",
            Self::WhiteLabel => "Remove SignDeck branding",
            Self::PrioritySupport => "Faster responses from support",
            Self::DedicatedAccountManager => "A named contact for your account",
            Self::ResellerPortal => "Manage customer accounts as a reseller",
            Self::SubAccounts => "Create isolated customer workspaces",
            Self::ResellerBilling => "Bill customers under your own plans",
        }
    }

    pub fn category(&self) -> FeatureCategory {
        match self {
            Self::Screens
            | Self::MediaLibrary
            | Self::Playlists
            | Self::BasicScheduling
            | Self::Layouts
            | Self::OfflinePlayback => FeatureCategory::Core,
            Self::Widgets | Self::Templates | Self::DesignEditor => FeatureCategory::Content,
            Self::Campaigns
            | Self::ScreenGroups
            | Self::AdvancedScheduling
            | Self::BulkOperations => FeatureCategory::Scheduling,
            Self::BasicAnalytics
            | Self::ProofOfPlay
            | Self::AdvancedAnalytics
            | Self::AuditLogs => FeatureCategory::Analytics,
            Self::AiAssistant | Self::AiContentGeneration => FeatureCategory::Ai,
            Self::ApiCalls | Self::Webhooks => FeatureCategory::Integrations,
            Self::CustomRoles | Self::Sso | Self::IpAllowlist => FeatureCategory::Security,
            Self::CustomDomain | Self::WhiteLabel => FeatureCategory::Branding,
            Self::PrioritySupport | Self::DedicatedAccountManager => FeatureCategory::Support,
            Self::ResellerPortal | Self::SubAccounts | Self::ResellerBilling => {
                FeatureCategory::Reseller
            }
        }
    }

    pub fn is_metered(&self) -> bool {
        Self::METERED.contains(self)
    }

    /// Full metadata record for this feature
    pub fn info(&self) -> FeatureInfo {
        FeatureInfo {
            key: *self,
            name: self.display_name().to_string(),
            description: self.description().to_string(),
            category: self.category(),
            metered: self.is_metered(),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("Unknown feature key: {}", s))
    }
}

/// Feature metadata as published to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureInfo {
    pub key: Feature,
    pub name: String,
    pub description: String,
    pub category: FeatureCategory,
    pub metered: bool,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_slug_default() {
        assert_eq!(PlanSlug::default(), PlanSlug::Free);
    }

    #[test]
    fn test_plan_ranks_are_dense() {
        for (i, plan) in PlanSlug::ALL.iter().enumerate() {
            assert_eq!(plan.rank() as usize, i);
        }
    }

    #[test]
    fn test_plan_slug_parsing() {
        assert_eq!("pro".parse::<PlanSlug>(), Ok(PlanSlug::Pro));
        assert_eq!("enterprise".parse::<PlanSlug>(), Ok(PlanSlug::Enterprise));
        assert!("team".parse::<PlanSlug>().is_err());
        // Slugs are exact; case and padding variants are not plans
        assert!("Enterprise".parse::<PlanSlug>().is_err());
        assert_eq!(PlanSlug::from_str_lossy("PRO"), PlanSlug::Free);
        assert_eq!(PlanSlug::from_str_lossy(" pro "), PlanSlug::Free);
        assert_eq!(PlanSlug::from_str_lossy("team"), PlanSlug::Free);
        assert_eq!(PlanSlug::from_str_lossy(""), PlanSlug::Free);
        assert_eq!(PlanSlug::from_str_lossy("reseller"), PlanSlug::Reseller);
    }

    #[test]
    fn test_plan_slug_next() {
        assert_eq!(PlanSlug::Free.next(), Some(PlanSlug::Starter));
        assert_eq!(PlanSlug::Enterprise.next(), Some(PlanSlug::Reseller));
        assert_eq!(PlanSlug::Reseller.next(), None);
        assert!(PlanSlug::Reseller.is_top_tier());
        assert!(!PlanSlug::Enterprise.is_top_tier());
    }

    #[test]
    fn test_plan_slug_serde() {
        assert_eq!(serde_json::to_string(&PlanSlug::Pro).unwrap(), "\"pro\"");
        let slug: PlanSlug = serde_json::from_str("\"starter\"").unwrap();
        assert_eq!(slug, PlanSlug::Starter);
    }

    #[test]
    fn test_feature_keys_round_trip_through_from_str() {
        for feature in Feature::ALL {
            assert_eq!(feature.key().parse::<Feature>(), Ok(feature));
            // serde and key() must agree, clients see the serde form
            assert_eq!(
                serde_json::to_string(&feature).unwrap(),
                format!("\"{}\"", feature.key())
            );
        }
        assert!("unknown_x".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_all_is_declaration_order() {
        let mut sorted = Feature::ALL;
        sorted.sort();
        assert_eq!(sorted, Feature::ALL);
    }

    #[test]
    fn test_metered_features() {
        assert!(Feature::AiAssistant.is_metered());
        assert!(Feature::Webhooks.is_metered());
        assert!(!Feature::Sso.is_metered());
        assert_eq!(Feature::METERED.len(), 7);
    }

    #[test]
    fn test_feature_info() {
        let info = Feature::AiAssistant.info();
        assert_eq!(info.key, Feature::AiAssistant);
        assert_eq!(info.name, "AI Assistant");
        assert_eq!(info.category, FeatureCategory::Ai);
        assert!(info.metered);
    }

    #[test]
    fn test_billing_cadence_parsing() {
        assert_eq!("monthly".parse::<BillingCadence>(), Ok(BillingCadence::Monthly));
        assert_eq!("annual".parse::<BillingCadence>(), Ok(BillingCadence::Yearly));
        assert!("weekly".parse::<BillingCadence>().is_err());
        assert_eq!(BillingCadence::default(), BillingCadence::Monthly);
    }

    #[test]
    fn test_limit_resource_parsing() {
        assert_eq!("screens".parse::<LimitResource>(), Ok(LimitResource::Screens));
        assert_eq!(
            "storage_gb".parse::<LimitResource>(),
            Ok(LimitResource::StorageGb)
        );
        assert!("cpu".parse::<LimitResource>().is_err());
    }
}
