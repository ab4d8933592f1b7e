// Tenant context for request handling

use adminjet_models::Organization;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TenantContext {
    pub org_id: Uuid,
    pub organization: Option<Organization>,
}

impl TenantContext {
    pub fn new(org_id: Uuid) -> Self {
        Self {
            org_id,
            organization: None,
        }
    }

    pub fn with_organization(org_id: Uuid, organization: Organization) -> Self {
        Self {
            org_id,
            organization: Some(organization),
        }
    }
}
