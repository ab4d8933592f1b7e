use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    Active,
    Revoked,
    Expired,
}

impl ApiKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyStatus::Active => "active",
            ApiKeyStatus::Revoked => "revoked",
            ApiKeyStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimits {
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
    pub requests_per_day: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            requests_per_minute: 100,
            requests_per_hour: 1_000,
            requests_per_day: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: i64,
    /// UTC calendar-day counter, reset lazily on the first validation of a
    /// new day.
    pub requests_today: i64,
    pub last_used: Option<DateTime<Utc>>,
    pub last_request_at: Option<DateTime<Utc>>,
    pub last_request_ip: Option<IpAddr>,
}

/// A bearer credential scoped to exactly one organization. Only the hash of
/// the secret is ever persisted; the raw key is surfaced once at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedApiKey {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    /// SHA-256 hex fingerprint of the raw secret. Unique.
    pub key_hash: String,
    /// First 8 characters of the raw secret, for display and identification
    /// only. Never used for auth decisions.
    pub key_prefix: String,
    /// Capability strings; may contain the wildcard `*`.
    pub scopes: Vec<String>,
    pub rate_limits: RateLimits,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_stats: UsageStats,
    pub status: ApiKeyStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Create new API key request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApiKeyRequest {
    pub org_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub scopes: Vec<String>,

    pub created_by: String,

    pub expires_at: Option<DateTime<Utc>>,

    pub rate_limits: Option<RateLimits>,
}

/// Issuance result. The raw key is not retrievable again after this value
/// is dropped.
#[derive(Debug, Serialize)]
pub struct ApiKeyWithSecret {
    pub api_key: ScopedApiKey,
    pub raw_key: String,
}

/// Listing view with the fingerprint stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeySummary {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub scopes: Vec<String>,
    pub status: ApiKeyStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ScopedApiKey> for ApiKeySummary {
    fn from(key: &ScopedApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name.clone(),
            key_prefix: key.key_prefix.clone(),
            scopes: key.scopes.clone(),
            status: key.status,
            expires_at: key.expires_at,
            last_used: key.usage_stats.last_used,
            created_at: key.created_at,
        }
    }
}
