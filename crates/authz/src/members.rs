use std::sync::Arc;

use adminjet_models::{
    audit::events, AuditEntryBuilder, MemberRole, MemberStatus, Organization, OrganizationMember,
};
use adminjet_store::{collections, DocumentStore, Filter};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::audit::AuditLogger;
use crate::error::{AuthzError, Result};
use crate::organizations::load_organization;

/// External identity lookup used to resolve a member's email address.
/// Best-effort: resolution failure is never fatal.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_email(&self, user_id: &str) -> Option<String>;
}

/// Resolver that never finds anything; membership falls back to placeholder
/// addresses.
pub struct NoopIdentityResolver;

#[async_trait]
impl IdentityResolver for NoopIdentityResolver {
    async fn resolve_email(&self, _user_id: &str) -> Option<String> {
        None
    }
}

fn placeholder_email(user_id: &str) -> String {
    format!("{user_id}@unresolved.invalid")
}

#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn IdentityResolver>,
    audit: AuditLogger,
}

impl MembershipService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn IdentityResolver>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            store,
            resolver,
            audit,
        }
    }

    /// Add a user to an organization, gated by the plan's member limit.
    pub async fn add_member(
        &self,
        org_id: Uuid,
        user_id: &str,
        role: MemberRole,
        invited_by: &str,
        email: Option<String>,
    ) -> Result<OrganizationMember> {
        let organization = load_organization(self.store.as_ref(), org_id).await?;

        if self.find_active_member(org_id, user_id).await?.is_some() {
            return Err(AuthzError::AlreadyMember);
        }

        let max_users = organization.settings.max_users;
        if organization.metadata.total_users >= max_users as i64 {
            return Err(AuthzError::OrgFull { max_users });
        }

        let email = match email {
            Some(email) => email,
            None => self
                .resolver
                .resolve_email(user_id)
                .await
                .unwrap_or_else(|| placeholder_email(user_id)),
        };

        let member = build_member(org_id, user_id, email, role, invited_by);
        let document = serde_json::to_value(&member).map_err(adminjet_store::StoreError::from)?;
        self.store
            .add(collections::ORGANIZATION_MEMBERS, document)
            .await?;

        self.store
            .atomic_increment(
                collections::ORGANIZATIONS,
                &org_id.to_string(),
                "metadata.total_users",
                1,
            )
            .await?;

        self.audit
            .append(
                AuditEntryBuilder::new(org_id, invited_by, events::MEMBER_ADDED)
                    .detail("member_user_id", user_id)
                    .detail("role", role.as_str())
                    .build(),
            )
            .await?;

        tracing::info!(%org_id, user_id, role = role.as_str(), "member added");

        Ok(member)
    }

    /// Get a user's active membership.
    pub async fn get_member(&self, org_id: Uuid, user_id: &str) -> Result<OrganizationMember> {
        self.find_active_member(org_id, user_id)
            .await?
            .ok_or(AuthzError::NotMember)
    }

    /// List an organization's active members.
    pub async fn list_members(&self, org_id: Uuid) -> Result<Vec<OrganizationMember>> {
        let documents = self
            .store
            .query(
                collections::ORGANIZATION_MEMBERS,
                &[
                    Filter::eq("org_id", org_id.to_string()),
                    Filter::eq("status", "active"),
                ],
                None,
            )
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect())
    }

    /// Change a member's role. The permission set is re-derived from the
    /// role table; it is never edited independently.
    pub async fn update_member_role(
        &self,
        org_id: Uuid,
        user_id: &str,
        new_role: MemberRole,
        updated_by: &str,
    ) -> Result<OrganizationMember> {
        let mut member = self.get_member(org_id, user_id).await?;

        if member.role == MemberRole::Owner && new_role != MemberRole::Owner {
            self.ensure_not_last_owner(org_id).await?;
        }

        member.role = new_role;
        member.permissions = new_role.permissions();

        self.store
            .update(
                collections::ORGANIZATION_MEMBERS,
                &member.id.to_string(),
                serde_json::json!({
                    "role": new_role.as_str(),
                    "permissions": member.permissions,
                }),
            )
            .await?;

        self.audit
            .append(
                AuditEntryBuilder::new(org_id, updated_by, events::MEMBER_ROLE_UPDATED)
                    .detail("member_user_id", user_id)
                    .detail("role", new_role.as_str())
                    .build(),
            )
            .await?;

        Ok(member)
    }

    /// Remove a user from an organization. The membership leaves the active
    /// query space and the member counter is decremented to mirror
    /// [`Self::add_member`].
    pub async fn remove_member(&self, org_id: Uuid, user_id: &str, removed_by: &str) -> Result<()> {
        let member = self.get_member(org_id, user_id).await?;

        if member.role == MemberRole::Owner {
            self.ensure_not_last_owner(org_id).await?;
        }

        self.store
            .update(
                collections::ORGANIZATION_MEMBERS,
                &member.id.to_string(),
                serde_json::json!({"status": "suspended"}),
            )
            .await?;

        self.store
            .atomic_increment(
                collections::ORGANIZATIONS,
                &org_id.to_string(),
                "metadata.total_users",
                -1,
            )
            .await?;

        self.audit
            .append(
                AuditEntryBuilder::new(org_id, removed_by, events::MEMBER_REMOVED)
                    .detail("member_user_id", user_id)
                    .build(),
            )
            .await?;

        tracing::info!(%org_id, user_id, "member removed");

        Ok(())
    }

    /// Enroll the creator as the first member with role `owner`. Called only
    /// from organization creation, which has already accounted for this
    /// member in `metadata.total_users`.
    pub(crate) async fn enroll_owner(
        &self,
        organization: &Organization,
    ) -> Result<OrganizationMember> {
        let user_id = organization.created_by.as_str();
        let email = self
            .resolver
            .resolve_email(user_id)
            .await
            .unwrap_or_else(|| placeholder_email(user_id));

        let member = build_member(organization.id, user_id, email, MemberRole::Owner, user_id);
        let document = serde_json::to_value(&member).map_err(adminjet_store::StoreError::from)?;
        self.store
            .add(collections::ORGANIZATION_MEMBERS, document)
            .await?;
        Ok(member)
    }

    async fn find_active_member(
        &self,
        org_id: Uuid,
        user_id: &str,
    ) -> Result<Option<OrganizationMember>> {
        let documents = self
            .store
            .query(
                collections::ORGANIZATION_MEMBERS,
                &[
                    Filter::eq("org_id", org_id.to_string()),
                    Filter::eq("user_id", user_id),
                    Filter::eq("status", "active"),
                ],
                Some(1),
            )
            .await?;

        Ok(documents
            .into_iter()
            .next()
            .and_then(|doc| serde_json::from_value(doc).ok()))
    }

    async fn ensure_not_last_owner(&self, org_id: Uuid) -> Result<()> {
        let owners = self
            .store
            .query(
                collections::ORGANIZATION_MEMBERS,
                &[
                    Filter::eq("org_id", org_id.to_string()),
                    Filter::eq("role", "owner"),
                    Filter::eq("status", "active"),
                ],
                Some(2),
            )
            .await?;

        if owners.len() <= 1 {
            return Err(AuthzError::Forbidden(
                "Cannot remove the last owner of an organization".to_string(),
            ));
        }
        Ok(())
    }
}

fn build_member(
    org_id: Uuid,
    user_id: &str,
    email: String,
    role: MemberRole,
    invited_by: &str,
) -> OrganizationMember {
    OrganizationMember {
        id: Uuid::new_v4(),
        org_id,
        user_id: user_id.to_string(),
        email,
        role,
        permissions: role.permissions(),
        status: MemberStatus::Active,
        joined_at: Utc::now(),
        invited_by: invited_by.to_string(),
    }
}
