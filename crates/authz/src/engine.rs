use std::sync::Arc;

use adminjet_store::DocumentStore;

use crate::api_keys::ApiKeyService;
use crate::audit::AuditLogger;
use crate::config::EngineConfig;
use crate::members::{IdentityResolver, MembershipService, NoopIdentityResolver};
use crate::metrics::MetricsService;
use crate::organizations::OrganizationService;
use crate::rate_limit::RateLimiter;

/// The authorization engine. Constructed once at process start with an
/// injected store client and passed to request handlers; nothing here is
/// module-global.
pub struct AuthzEngine {
    store: Arc<dyn DocumentStore>,
    organizations: OrganizationService,
    members: MembershipService,
    api_keys: ApiKeyService,
    metrics: MetricsService,
    audit: AuditLogger,
    limiter: RateLimiter,
}

impl AuthzEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn IdentityResolver>,
        config: EngineConfig,
    ) -> Self {
        let audit = AuditLogger::new(store.clone());
        let members = MembershipService::new(store.clone(), resolver, audit.clone());
        let organizations =
            OrganizationService::new(store.clone(), members.clone(), audit.clone());
        let api_keys = ApiKeyService::new(store.clone(), members.clone(), audit.clone(), config);
        let metrics = MetricsService::new(store.clone());

        Self {
            store,
            organizations,
            members,
            api_keys,
            metrics,
            audit,
            limiter: RateLimiter::new(),
        }
    }

    /// Engine with no identity lookup and default configuration.
    pub fn with_defaults(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, Arc::new(NoopIdentityResolver), EngineConfig::default())
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn organizations(&self) -> &OrganizationService {
        &self.organizations
    }

    pub fn members(&self) -> &MembershipService {
        &self.members
    }

    pub fn api_keys(&self) -> &ApiKeyService {
        &self.api_keys
    }

    pub fn metrics(&self) -> &MetricsService {
        &self.metrics
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub(crate) fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
