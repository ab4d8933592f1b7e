//! Capability identifiers shared by member permissions and API key scopes.
//! Flat strings; the wildcard grants everything.

pub const WILDCARD: &str = "*";

// Data access
pub const DATA_READ: &str = "data.read";
pub const DATA_WRITE: &str = "data.write";
pub const DATA_DELETE: &str = "data.delete";

// Webhooks
pub const WEBHOOKS_READ: &str = "webhooks.read";
pub const WEBHOOKS_WRITE: &str = "webhooks.write";
pub const WEBHOOKS_DELETE: &str = "webhooks.delete";

// Organization management
pub const ORG_READ: &str = "org.read";
pub const ORG_UPDATE: &str = "org.update";
pub const ORG_MEMBERS_READ: &str = "org.members.read";
pub const ORG_MEMBERS_ADD: &str = "org.members.add";
pub const ORG_MEMBERS_REMOVE: &str = "org.members.remove";
pub const ORG_MEMBERS_MANAGE: &str = "org.members.manage";
pub const ORG_APIKEYS_READ: &str = "org.apikeys.read";
pub const ORG_APIKEYS_CREATE: &str = "org.apikeys.create";
pub const ORG_APIKEYS_REVOKE: &str = "org.apikeys.revoke";

// Analytics
pub const ANALYTICS_READ: &str = "analytics.read";
pub const ANALYTICS_EXPORT: &str = "analytics.export";

// Billing
pub const BILLING_READ: &str = "billing.read";
pub const BILLING_WRITE: &str = "billing.write";
