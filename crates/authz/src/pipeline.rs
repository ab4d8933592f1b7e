//! Request authorization pipeline: credential extraction, validation, scope
//! checks, rate limiting and tenant filter resolution, composed in one call
//! for inbound API requests.

use std::net::IpAddr;

use adminjet_models::{Organization, ScopedApiKey};
use adminjet_store::Filter;
use adminjet_tenant::{tenant_filters, TenantContext};

use crate::engine::AuthzEngine;
use crate::error::{AuthzError, Result};
use crate::permissions::{has_any_scope, missing_scopes};
use crate::rate_limit::{RateLimitDecision, RateLimitWindow};

const MISSING_HEADER: &str = "Missing or malformed Authorization header";

/// What an endpoint demands of the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestRequirements<'a> {
    /// The credential must carry at least one of these (or the wildcard).
    pub scopes: &'a [&'a str],
    pub require_active_subscription: bool,
    pub enforce_rate_limit: bool,
    /// Target collection; when set, the matching tenant predicate is
    /// resolved and attached for the downstream data access.
    pub collection: Option<&'a str>,
    pub client_ip: Option<IpAddr>,
}

/// Authenticated and authorized request context.
#[derive(Debug, Clone)]
pub struct AuthorizedRequest {
    pub api_key: ScopedApiKey,
    pub organization: Organization,
    pub tenant: TenantContext,
    /// Predicate the downstream handler must apply to its store queries.
    pub tenant_filters: Vec<Filter>,
    pub rate_limit: Option<RateLimitDecision>,
}

/// Pull the credential out of an `Authorization` header value. Accepts the
/// `Bearer` and `ApiKey` schemes, case-insensitively.
fn extract_credential(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") && !scheme.eq_ignore_ascii_case("apikey") {
        return None;
    }
    let credential = rest.trim();
    if credential.is_empty() {
        None
    } else {
        Some(credential)
    }
}

impl AuthzEngine {
    /// Authorize one inbound request. Failures map to HTTP-style statuses
    /// via [`AuthzError::status`]: 401 for authentication, 403 for missing
    /// scope or inactive subscription, 429 for rate limiting.
    pub async fn authorize_request(
        &self,
        authorization: Option<&str>,
        requirements: RequestRequirements<'_>,
    ) -> Result<AuthorizedRequest> {
        let header =
            authorization.ok_or_else(|| AuthzError::Unauthenticated(MISSING_HEADER.to_string()))?;
        let credential = extract_credential(header)
            .ok_or_else(|| AuthzError::Unauthenticated(MISSING_HEADER.to_string()))?;

        let validation = self
            .api_keys()
            .validate_api_key(credential, requirements.client_ip)
            .await?;

        // The validator already rejects inactive subscriptions; this guard
        // stays for callers that re-check after a subscription write.
        if requirements.require_active_subscription && !validation.organization.is_active() {
            return Err(AuthzError::SubscriptionInactive);
        }

        if !requirements.scopes.is_empty() && !has_any_scope(&validation, requirements.scopes) {
            let missing = missing_scopes(&validation.api_key, requirements.scopes);
            tracing::warn!(
                key_id = %validation.api_key.id,
                missing = ?missing,
                "request denied: missing scopes"
            );
            return Err(AuthzError::Forbidden(format!(
                "Missing required scopes: {}",
                missing.join(", ")
            )));
        }

        let rate_limit = if requirements.enforce_rate_limit {
            let decision = self.rate_limiter().check(
                &validation.api_key.id,
                &validation.api_key.rate_limits,
                RateLimitWindow::Minute,
            );
            if !decision.allowed {
                return Err(AuthzError::RateLimited);
            }
            Some(decision)
        } else {
            None
        };

        let org_id = validation.organization.id;
        let tenant_filters = requirements
            .collection
            .map(|collection| tenant_filters(org_id, collection))
            .unwrap_or_default();

        Ok(AuthorizedRequest {
            tenant: TenantContext::with_organization(org_id, validation.organization.clone()),
            api_key: validation.api_key,
            organization: validation.organization,
            tenant_filters,
            rate_limit,
        })
    }
}
