use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only activity record. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub org_id: Uuid,
    pub user_id: String,
    pub action: String,
    pub metadata: serde_json::Value,
    pub success: bool,
}

/// Helper builder for audit entries.
pub struct AuditEntryBuilder {
    entry: AuditLogEntry,
}

impl AuditEntryBuilder {
    pub fn new(org_id: Uuid, user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            entry: AuditLogEntry {
                id: Uuid::new_v4(),
                timestamp: Utc::now(),
                org_id,
                user_id: user_id.into(),
                action: action.into(),
                metadata: serde_json::json!({}),
                success: true,
            },
        }
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.entry.metadata = metadata;
        self
    }

    pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        if let Some(map) = self.entry.metadata.as_object_mut() {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Mark the entry as a failed (or partially applied) operation and
    /// record the reason.
    pub fn failure(mut self, reason: impl Into<String>) -> Self {
        self.entry.success = false;
        if let Some(map) = self.entry.metadata.as_object_mut() {
            map.insert("reason".to_string(), serde_json::Value::String(reason.into()));
        }
        self
    }

    pub fn build(self) -> AuditLogEntry {
        self.entry
    }
}

/// Action names for every state-changing operation in the engine.
pub mod events {
    // Organization lifecycle
    pub const ORGANIZATION_CREATED: &str = "organization_created";
    pub const ORGANIZATION_SUSPENDED: &str = "organization_suspended";
    pub const ORGANIZATION_REACTIVATED: &str = "organization_reactivated";

    // Membership
    pub const MEMBER_ADDED: &str = "member_added";
    pub const MEMBER_REMOVED: &str = "member_removed";
    pub const MEMBER_ROLE_UPDATED: &str = "member_role_updated";

    // API keys
    pub const API_KEY_CREATED: &str = "api_key_created";
    pub const API_KEY_REVOKED: &str = "api_key_revoked";
}
