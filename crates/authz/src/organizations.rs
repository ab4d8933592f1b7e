use std::sync::Arc;

use adminjet_models::{
    audit::events, is_valid_slug, AuditEntryBuilder, CreateOrganizationRequest, Organization,
    OrganizationMetadata, OrganizationSettings, Subscription, SubscriptionStatus,
};
use adminjet_store::{collections, DocumentStore, Filter};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::audit::AuditLogger;
use crate::error::{AuthzError, Result};
use crate::members::MembershipService;

pub(crate) async fn load_organization(
    store: &dyn DocumentStore,
    org_id: Uuid,
) -> Result<Organization> {
    let document = store
        .get(collections::ORGANIZATIONS, &org_id.to_string())
        .await?
        .ok_or(AuthzError::OrganizationNotFound)?;
    serde_json::from_value(document)
        .map_err(|e| AuthzError::Internal(format!("malformed organization record: {e}")))
}

#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn DocumentStore>,
    members: MembershipService,
    audit: AuditLogger,
}

impl OrganizationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        members: MembershipService,
        audit: AuditLogger,
    ) -> Self {
        Self {
            store,
            members,
            audit,
        }
    }

    /// Create an organization and enroll the creator as its first owner.
    ///
    /// The slug-uniqueness check and the insert are two separate store
    /// operations; two concurrent creations with the same slug can both
    /// pass the check. Acceptable at expected load, see DESIGN.md.
    pub async fn create_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<Organization> {
        request.validate()?;
        if !is_valid_slug(&request.slug) {
            return Err(AuthzError::Validation(format!(
                "invalid slug '{}': lowercase alphanumerics and single dashes only",
                request.slug
            )));
        }

        let existing = self
            .store
            .query(
                collections::ORGANIZATIONS,
                &[Filter::eq("slug", request.slug.clone())],
                Some(1),
            )
            .await?;
        if !existing.is_empty() {
            return Err(AuthzError::SlugTaken(request.slug));
        }

        let plan = request.plan.unwrap_or_default();
        let mut settings = OrganizationSettings::for_plan(plan);
        if let Some(extra) = &request.features {
            for feature in extra {
                if !settings.has_feature(feature) {
                    settings.features.push(feature.clone());
                }
            }
        }

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: request.name,
            slug: request.slug,
            description: request.description,
            settings,
            subscription: Subscription::new(plan),
            // The creator is enrolled as the first member below.
            metadata: OrganizationMetadata {
                total_users: 1,
                ..Default::default()
            },
            created_by: request.created_by,
            created_at: now,
            updated_at: now,
        };

        let document =
            serde_json::to_value(&organization).map_err(adminjet_store::StoreError::from)?;
        self.store.add(collections::ORGANIZATIONS, document).await?;

        if let Err(e) = self.members.enroll_owner(&organization).await {
            // The organization record exists without an owner at this point.
            // Record the partial state so operators can detect and repair it.
            self.audit
                .append_best_effort(
                    AuditEntryBuilder::new(
                        organization.id,
                        organization.created_by.as_str(),
                        events::ORGANIZATION_CREATED,
                    )
                    .detail("slug", organization.slug.clone())
                    .detail("plan", plan.as_str())
                    .failure(format!("owner enrollment failed: {e}"))
                    .build(),
                )
                .await;
            tracing::error!(
                org_id = %organization.id,
                error = %e,
                "organization created without owner enrollment"
            );
            return Err(e);
        }

        self.audit
            .append(
                AuditEntryBuilder::new(
                    organization.id,
                    organization.created_by.as_str(),
                    events::ORGANIZATION_CREATED,
                )
                .detail("slug", organization.slug.clone())
                .detail("plan", plan.as_str())
                .build(),
            )
            .await?;

        tracing::info!(
            org_id = %organization.id,
            slug = %organization.slug,
            plan = plan.as_str(),
            "organization created"
        );

        Ok(organization)
    }

    pub async fn get_organization(&self, org_id: Uuid) -> Result<Organization> {
        load_organization(self.store.as_ref(), org_id).await
    }

    pub async fn get_organization_by_slug(&self, slug: &str) -> Result<Organization> {
        let documents = self
            .store
            .query(
                collections::ORGANIZATIONS,
                &[Filter::eq("slug", slug)],
                Some(1),
            )
            .await?;
        let document = documents
            .into_iter()
            .next()
            .ok_or(AuthzError::OrganizationNotFound)?;
        serde_json::from_value(document)
            .map_err(|e| AuthzError::Internal(format!("malformed organization record: {e}")))
    }

    /// Full organization scan, used by the metrics aggregator.
    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        let documents = self
            .store
            .query(collections::ORGANIZATIONS, &[], None)
            .await?;
        Ok(documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect())
    }

    /// Deactivation and reactivation. Organizations are never hard-deleted;
    /// an inactive subscription rejects API traffic while keeping all data.
    pub async fn update_subscription_status(
        &self,
        org_id: Uuid,
        status: SubscriptionStatus,
        updated_by: &str,
    ) -> Result<Organization> {
        let mut organization = load_organization(self.store.as_ref(), org_id).await?;
        organization.subscription.status = status;
        organization.updated_at = Utc::now();

        self.store
            .update(
                collections::ORGANIZATIONS,
                &org_id.to_string(),
                serde_json::json!({
                    "subscription.status": status,
                    "updated_at": organization.updated_at,
                }),
            )
            .await?;

        let action = if status == SubscriptionStatus::Active {
            events::ORGANIZATION_REACTIVATED
        } else {
            events::ORGANIZATION_SUSPENDED
        };
        self.audit
            .append(
                AuditEntryBuilder::new(org_id, updated_by, action)
                    .detail("status", serde_json::to_value(status).unwrap_or_default())
                    .build(),
            )
            .await?;

        Ok(organization)
    }
}
