// Core modules
pub mod api_key;
pub mod audit;
pub mod member;
pub mod organization;
pub mod scopes;

// Re-export commonly used types
pub use api_key::{
    ApiKeyStatus, ApiKeySummary, ApiKeyWithSecret, CreateApiKeyRequest, RateLimits, ScopedApiKey,
    UsageStats,
};
pub use audit::{AuditEntryBuilder, AuditLogEntry};
pub use member::{MemberRole, MemberStatus, OrganizationMember};
pub use organization::{
    is_valid_slug, CreateOrganizationRequest, Organization, OrganizationMetadata,
    OrganizationSettings, Plan, Subscription, SubscriptionStatus,
};
