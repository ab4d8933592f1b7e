use std::sync::Arc;

use adminjet_models::{ApiKeyStatus, MemberStatus, Organization, OrganizationMember, ScopedApiKey};
use adminjet_store::{collections, DocumentStore};
use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;

const BYTES_PER_GB: f64 = (1024 * 1024 * 1024) as f64;

/// Fleet-wide summary across organizations, members and keys.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformMetrics {
    pub total_organizations: usize,
    pub active_organizations: usize,
    pub total_members: usize,
    pub total_api_keys: usize,
    pub avg_members_per_organization: f64,
    pub total_data_usage_gb: f64,
    pub api_requests_24h: i64,
    pub top_organizations: Vec<OrganizationActivity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationActivity {
    pub org_id: Uuid,
    pub name: String,
    pub slug: String,
    pub total_users: i64,
    pub total_api_keys: i64,
    pub activity_score: i64,
}

/// Read-only full scan. Fine at hundreds of organizations; a maintained
/// rollup should replace it before the fleet outgrows that.
#[derive(Clone)]
pub struct MetricsService {
    store: Arc<dyn DocumentStore>,
}

impl MetricsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn platform_metrics(&self) -> Result<PlatformMetrics> {
        let organizations: Vec<Organization> = self.scan(collections::ORGANIZATIONS).await?;
        let members: Vec<OrganizationMember> =
            self.scan(collections::ORGANIZATION_MEMBERS).await?;
        let api_keys: Vec<ScopedApiKey> = self.scan(collections::API_KEYS).await?;

        let total_organizations = organizations.len();
        let active_organizations = organizations.iter().filter(|o| o.is_active()).count();
        let total_members = members
            .iter()
            .filter(|m| m.status == MemberStatus::Active)
            .count();
        let total_api_keys = api_keys
            .iter()
            .filter(|k| k.status == ApiKeyStatus::Active)
            .count();

        let avg_members_per_organization = if total_organizations == 0 {
            0.0
        } else {
            round2(total_members as f64 / total_organizations as f64)
        };

        let total_bytes: i64 = organizations
            .iter()
            .map(|o| o.metadata.data_usage_bytes)
            .sum();
        let total_data_usage_gb = round2(total_bytes as f64 / BYTES_PER_GB);

        let window_start = Utc::now() - Duration::hours(24);
        let api_requests_24h = api_keys
            .iter()
            .filter(|k| {
                k.usage_stats
                    .last_request_at
                    .map(|t| t >= window_start)
                    .unwrap_or(false)
            })
            .map(|k| k.usage_stats.requests_today)
            .sum();

        let mut top_organizations: Vec<OrganizationActivity> = organizations
            .iter()
            .map(|o| OrganizationActivity {
                org_id: o.id,
                name: o.name.clone(),
                slug: o.slug.clone(),
                total_users: o.metadata.total_users,
                total_api_keys: o.metadata.total_api_keys,
                activity_score: o.metadata.total_users * 10 + o.metadata.total_api_keys * 5,
            })
            .collect();
        top_organizations.sort_by(|a, b| b.activity_score.cmp(&a.activity_score));
        top_organizations.truncate(5);

        Ok(PlatformMetrics {
            total_organizations,
            active_organizations,
            total_members,
            total_api_keys,
            avg_members_per_organization,
            total_data_usage_gb,
            api_requests_24h,
            top_organizations,
        })
    }

    async fn scan<T: serde::de::DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let documents = self.store.query(collection, &[], None).await?;
        Ok(documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
