pub mod api_keys;
pub mod audit;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod members;
pub mod metrics;
pub mod organizations;
pub mod permissions;
pub mod pipeline;
pub mod rate_limit;

pub use api_keys::{ApiKeyService, ApiKeyValidation};
pub use audit::AuditLogger;
pub use config::EngineConfig;
pub use engine::AuthzEngine;
pub use error::{AuthzError, Result};
pub use members::{IdentityResolver, MembershipService, NoopIdentityResolver};
pub use metrics::{MetricsService, OrganizationActivity, PlatformMetrics};
pub use organizations::OrganizationService;
pub use permissions::{has_any_scope, has_permission, has_scope, missing_scopes};
pub use pipeline::{AuthorizedRequest, RequestRequirements};
pub use rate_limit::{RateLimitDecision, RateLimitWindow, RateLimiter};
