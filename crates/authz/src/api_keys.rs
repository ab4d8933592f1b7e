use std::net::IpAddr;
use std::sync::Arc;

use adminjet_models::{
    audit::events, scopes, ApiKeyStatus, ApiKeySummary, ApiKeyWithSecret, AuditEntryBuilder,
    CreateApiKeyRequest, Organization, ScopedApiKey, UsageStats,
};
use adminjet_store::{collections, DocumentStore, Filter};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::audit::AuditLogger;
use crate::config::EngineConfig;
use crate::credentials;
use crate::error::{AuthzError, Result};
use crate::members::MembershipService;
use crate::organizations::load_organization;
use crate::permissions::has_permission;

/// Result of authenticating a bearer credential: the key and the
/// organization it belongs to.
#[derive(Debug, Clone)]
pub struct ApiKeyValidation {
    pub api_key: ScopedApiKey,
    pub organization: Organization,
}

#[derive(Clone)]
pub struct ApiKeyService {
    store: Arc<dyn DocumentStore>,
    members: MembershipService,
    audit: AuditLogger,
    config: EngineConfig,
}

impl ApiKeyService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        members: MembershipService,
        audit: AuditLogger,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            members,
            audit,
            config,
        }
    }

    /// Issue a scoped key for one organization. The raw secret is returned
    /// exactly once; only its fingerprint and display prefix are persisted.
    pub async fn create_api_key(&self, request: CreateApiKeyRequest) -> Result<ApiKeyWithSecret> {
        request.validate()?;

        let organization = load_organization(self.store.as_ref(), request.org_id).await?;

        let max_api_keys = organization.settings.max_api_keys;
        if organization.metadata.total_api_keys >= max_api_keys as i64 {
            return Err(AuthzError::OrgAtKeyLimit { max_api_keys });
        }

        self.require_member_permission(
            request.org_id,
            &request.created_by,
            scopes::ORG_APIKEYS_CREATE,
        )
        .await?;

        let now = Utc::now();
        let raw_key = credentials::generate_raw_key(
            &request.org_id,
            now,
            self.config.key_secret_bytes,
        );

        let api_key = ScopedApiKey {
            id: Uuid::new_v4(),
            org_id: request.org_id,
            name: request.name,
            key_hash: credentials::fingerprint(&raw_key),
            key_prefix: credentials::key_prefix(&raw_key),
            scopes: request.scopes,
            rate_limits: request
                .rate_limits
                .unwrap_or(self.config.default_rate_limits),
            expires_at: request.expires_at,
            usage_stats: UsageStats::default(),
            status: ApiKeyStatus::Active,
            created_by: request.created_by.clone(),
            created_at: now,
        };

        let document = serde_json::to_value(&api_key).map_err(adminjet_store::StoreError::from)?;
        self.store.add(collections::API_KEYS, document).await?;

        self.store
            .atomic_increment(
                collections::ORGANIZATIONS,
                &request.org_id.to_string(),
                "metadata.total_api_keys",
                1,
            )
            .await?;

        self.audit
            .append(
                AuditEntryBuilder::new(request.org_id, request.created_by.as_str(), events::API_KEY_CREATED)
                    .detail("key_id", api_key.id.to_string())
                    .detail("name", api_key.name.clone())
                    .detail("scopes", serde_json::to_value(&api_key.scopes).unwrap_or_default())
                    .build(),
            )
            .await?;

        tracing::info!(
            org_id = %request.org_id,
            key_id = %api_key.id,
            key_prefix = %api_key.key_prefix,
            "API key created"
        );

        Ok(ApiKeyWithSecret { api_key, raw_key })
    }

    /// Authenticate a raw bearer credential and charge it one request.
    ///
    /// One point lookup plus counter increments; counters are never
    /// read-modify-written, so concurrent validations cannot under-count.
    pub async fn validate_api_key(
        &self,
        raw_key: &str,
        client_ip: Option<IpAddr>,
    ) -> Result<ApiKeyValidation> {
        let key_hash = credentials::fingerprint(raw_key);
        let documents = self
            .store
            .query(
                collections::API_KEYS,
                &[
                    Filter::eq("key_hash", key_hash),
                    Filter::eq("status", "active"),
                ],
                Some(1),
            )
            .await?;

        let document = documents
            .into_iter()
            .next()
            .ok_or_else(|| AuthzError::Unauthenticated("Invalid API key".to_string()))?;
        let mut api_key: ScopedApiKey = serde_json::from_value(document)
            .map_err(|e| AuthzError::Internal(format!("malformed API key record: {e}")))?;

        let now = Utc::now();

        if let Some(expires_at) = api_key.expires_at {
            if expires_at <= now {
                // Lazy transition. The lookup above only matched an active
                // record; a concurrent validation writing the same status is
                // harmless.
                self.store
                    .update(
                        collections::API_KEYS,
                        &api_key.id.to_string(),
                        serde_json::json!({"status": "expired"}),
                    )
                    .await?;
                tracing::info!(key_id = %api_key.id, "API key lazily expired");
                return Err(AuthzError::CredentialExpired);
            }
        }

        let organization = match load_organization(self.store.as_ref(), api_key.org_id).await {
            Ok(organization) => organization,
            Err(AuthzError::OrganizationNotFound) => {
                return Err(AuthzError::Internal(format!(
                    "organization record missing for API key {}",
                    api_key.id
                )))
            }
            Err(e) => return Err(e),
        };

        // The key itself stays active; only requests are rejected while the
        // subscription is not.
        if !organization.is_active() {
            return Err(AuthzError::SubscriptionInactive);
        }

        let key_id = api_key.id.to_string();
        let same_day = api_key
            .usage_stats
            .last_request_at
            .map(|t| t.date_naive() == now.date_naive())
            .unwrap_or(false);

        if same_day {
            self.store
                .atomic_increment(collections::API_KEYS, &key_id, "usage_stats.requests_today", 1)
                .await?;
            api_key.usage_stats.requests_today += 1;
        } else {
            // First request of a new UTC day: calendar-day reset.
            self.store
                .update(
                    collections::API_KEYS,
                    &key_id,
                    serde_json::json!({"usage_stats.requests_today": 1}),
                )
                .await?;
            api_key.usage_stats.requests_today = 1;
        }

        self.store
            .atomic_increment(collections::API_KEYS, &key_id, "usage_stats.total_requests", 1)
            .await?;
        api_key.usage_stats.total_requests += 1;

        let mut patch = serde_json::json!({
            "usage_stats.last_used": now,
            "usage_stats.last_request_at": now,
        });
        if let Some(ip) = client_ip {
            patch["usage_stats.last_request_ip"] = serde_json::Value::String(ip.to_string());
        }
        self.store
            .update(collections::API_KEYS, &key_id, patch)
            .await?;

        api_key.usage_stats.last_used = Some(now);
        api_key.usage_stats.last_request_at = Some(now);
        api_key.usage_stats.last_request_ip = client_ip;

        Ok(ApiKeyValidation {
            api_key,
            organization,
        })
    }

    /// Revoke a key. Idempotent: revoking an already-revoked key is a
    /// no-op.
    pub async fn revoke_api_key(
        &self,
        org_id: Uuid,
        key_id: Uuid,
        revoked_by: &str,
    ) -> Result<ScopedApiKey> {
        self.require_member_permission(org_id, revoked_by, scopes::ORG_APIKEYS_REVOKE)
            .await?;

        let document = self
            .store
            .get(collections::API_KEYS, &key_id.to_string())
            .await?
            .ok_or(AuthzError::ApiKeyNotFound)?;
        let mut api_key: ScopedApiKey = serde_json::from_value(document)
            .map_err(|e| AuthzError::Internal(format!("malformed API key record: {e}")))?;

        // Keys from other organizations are reported as absent.
        if api_key.org_id != org_id {
            return Err(AuthzError::ApiKeyNotFound);
        }

        if api_key.status == ApiKeyStatus::Revoked {
            return Ok(api_key);
        }

        self.store
            .update(
                collections::API_KEYS,
                &key_id.to_string(),
                serde_json::json!({"status": "revoked"}),
            )
            .await?;
        api_key.status = ApiKeyStatus::Revoked;

        self.store
            .atomic_increment(
                collections::ORGANIZATIONS,
                &org_id.to_string(),
                "metadata.total_api_keys",
                -1,
            )
            .await?;

        self.audit
            .append(
                AuditEntryBuilder::new(org_id, revoked_by, events::API_KEY_REVOKED)
                    .detail("key_id", key_id.to_string())
                    .build(),
            )
            .await?;

        tracing::warn!(%org_id, %key_id, "API key revoked");

        Ok(api_key)
    }

    /// List an organization's keys with fingerprints stripped.
    pub async fn list_api_keys(&self, org_id: Uuid) -> Result<Vec<ApiKeySummary>> {
        let documents = self
            .store
            .query(
                collections::API_KEYS,
                &[Filter::eq("org_id", org_id.to_string())],
                None,
            )
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value::<ScopedApiKey>(doc).ok())
            .map(|key| ApiKeySummary::from(&key))
            .collect())
    }

    async fn require_member_permission(
        &self,
        org_id: Uuid,
        user_id: &str,
        permission: &str,
    ) -> Result<()> {
        let member = match self.members.get_member(org_id, user_id).await {
            Ok(member) => member,
            Err(AuthzError::NotMember) => {
                return Err(AuthzError::Forbidden(format!(
                    "This action requires the {permission} permission"
                )))
            }
            Err(e) => return Err(e),
        };

        if !has_permission(&member, permission) {
            return Err(AuthzError::Forbidden(format!(
                "This action requires the {permission} permission"
            )));
        }
        Ok(())
    }
}
