use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Subscription plan tier. Each tier maps to a fixed settings bundle,
/// see [`OrganizationSettings::for_plan`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Default for Plan {
    fn default() -> Self {
        Plan::Free
    }
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Suspended,
}

/// Organization (tenant): the isolation boundary that owns members,
/// API keys and tenant-scoped data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// URL-safe, globally unique, immutable once minted.
    pub slug: String,
    pub description: Option<String>,

    pub settings: OrganizationSettings,
    pub subscription: Subscription,

    /// Running counters, mutated only through atomic increments.
    pub metadata: OrganizationMetadata,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Whether requests on behalf of this organization are accepted.
    pub fn is_active(&self) -> bool {
        self.subscription.status == SubscriptionStatus::Active
    }
}

/// Plan-derived limits and feature switches. Set at creation from the plan
/// tier, mutable only by an explicit settings update afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSettings {
    pub max_users: u32,
    pub max_api_keys: u32,
    pub data_retention_days: u32,
    pub features: Vec<String>,

    #[serde(default)]
    pub enable_billing: bool,
    #[serde(default)]
    pub enable_api_access: bool,
    #[serde(default)]
    pub enable_webhooks: bool,
}

impl OrganizationSettings {
    /// The fixed plan → settings table.
    pub fn for_plan(plan: Plan) -> Self {
        match plan {
            Plan::Free => Self {
                max_users: 5,
                max_api_keys: 2,
                data_retention_days: 30,
                features: vec![features::BASIC_ANALYTICS.to_string()],
                enable_billing: false,
                enable_api_access: false,
                enable_webhooks: false,
            },
            Plan::Pro => Self {
                max_users: 25,
                max_api_keys: 5,
                data_retention_days: 90,
                features: vec![
                    features::BASIC_ANALYTICS.to_string(),
                    features::ADVANCED_ANALYTICS.to_string(),
                    features::WEBHOOK_ACCESS.to_string(),
                ],
                enable_billing: true,
                enable_api_access: false,
                enable_webhooks: true,
            },
            Plan::Enterprise => Self {
                max_users: 100,
                max_api_keys: 20,
                data_retention_days: 365,
                features: vec![
                    features::BASIC_ANALYTICS.to_string(),
                    features::ADVANCED_ANALYTICS.to_string(),
                    features::WEBHOOK_ACCESS.to_string(),
                    features::API_ACCESS.to_string(),
                    features::SLO_MONITORING.to_string(),
                    features::BACKUP_RESTORE.to_string(),
                ],
                enable_billing: true,
                enable_api_access: true,
                enable_webhooks: true,
            },
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub billing_email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            status: SubscriptionStatus::Active,
            billing_email: None,
            expires_at: None,
        }
    }
}

/// Running counters. Never read-modify-written; every mutation goes through
/// the store's atomic increment primitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationMetadata {
    pub total_users: i64,
    pub total_api_keys: i64,
    pub data_usage_bytes: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Create new organization request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 3, max = 63))]
    pub slug: String,

    pub created_by: String,

    pub description: Option<String>,

    pub plan: Option<Plan>,

    /// Extra feature flags merged into the plan-derived set.
    pub features: Option<Vec<String>>,
}

/// Slug charset check, applied on top of the derive-level length bounds.
/// Lowercase alphanumerics separated by single dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Feature flag names granted by the plan tiers.
pub mod features {
    pub const BASIC_ANALYTICS: &str = "basic_analytics";
    pub const ADVANCED_ANALYTICS: &str = "advanced_analytics";
    pub const WEBHOOK_ACCESS: &str = "webhook_access";
    pub const API_ACCESS: &str = "api_access";
    pub const SLO_MONITORING: &str = "slo_monitoring";
    pub const BACKUP_RESTORE: &str = "backup_restore";
}
