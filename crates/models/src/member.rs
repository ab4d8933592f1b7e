use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scopes;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
        }
    }

    /// The static role → permission-set table. A member's permissions are
    /// fully determined by this table at creation (and on role change),
    /// never edited independently.
    pub fn permissions(&self) -> Vec<String> {
        let granted: &[&str] = match self {
            MemberRole::Owner => &[scopes::WILDCARD],
            MemberRole::Admin => &[
                scopes::ORG_READ,
                scopes::ORG_UPDATE,
                scopes::ORG_MEMBERS_READ,
                scopes::ORG_MEMBERS_ADD,
                scopes::ORG_MEMBERS_REMOVE,
                scopes::ORG_APIKEYS_READ,
                scopes::ORG_APIKEYS_CREATE,
                scopes::ORG_APIKEYS_REVOKE,
                scopes::DATA_READ,
                scopes::DATA_WRITE,
                scopes::WEBHOOKS_READ,
                scopes::WEBHOOKS_WRITE,
            ],
            MemberRole::Member => &[
                scopes::ORG_READ,
                scopes::ORG_MEMBERS_READ,
                scopes::DATA_READ,
                scopes::DATA_WRITE,
                scopes::WEBHOOKS_READ,
            ],
            MemberRole::Viewer => &[scopes::ORG_READ, scopes::ORG_MEMBERS_READ, scopes::DATA_READ],
        };
        granted.iter().map(|p| p.to_string()).collect()
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Pending,
    Suspended,
}

/// Membership of one user in one organization. The `(org_id, user_id)` pair
/// is unique among active memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub id: Uuid,
    pub org_id: Uuid,
    pub user_id: String,
    pub email: String,
    pub role: MemberRole,
    /// Derived from `role` via [`MemberRole::permissions`]. May contain the
    /// wildcard `*`.
    pub permissions: Vec<String>,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub invited_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn permission_set(role: MemberRole) -> HashSet<String> {
        role.permissions().into_iter().collect()
    }

    #[test]
    fn role_permission_table() {
        assert_eq!(MemberRole::Owner.permissions(), vec!["*"]);

        let admin = permission_set(MemberRole::Admin);
        assert!(admin.contains("org.apikeys.create"));
        assert!(admin.contains("org.members.remove"));
        assert!(!admin.contains("*"));

        let member = permission_set(MemberRole::Member);
        assert!(member.contains("data.write"));
        assert!(!member.contains("org.apikeys.create"));
    }

    #[test]
    fn viewer_is_strict_subset_of_member() {
        let viewer = permission_set(MemberRole::Viewer);
        let member = permission_set(MemberRole::Member);
        assert!(viewer.is_subset(&member));
        assert!(viewer.len() < member.len());
    }
}
