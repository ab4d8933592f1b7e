//! Tenant filter resolution. The single chokepoint every data-access call
//! must consult before querying the store.

use adminjet_store::{collections, Filter};
use uuid::Uuid;

/// Collections whose documents belong to exactly one organization. Reads and
/// writes against these must carry the `org_id` predicate.
pub const TENANT_SCOPED_COLLECTIONS: &[&str] = &[
    collections::CONTRACTS,
    collections::CREDIT_APPLICATIONS,
    collections::BACKUP_JOBS,
    collections::SECRET_ROTATION_JOBS,
    collections::AUDIT_LOGS,
];

pub fn is_tenant_scoped(collection: &str) -> bool {
    TENANT_SCOPED_COLLECTIONS.contains(&collection)
}

/// Predicate scoping `collection` to one organization's documents. Empty for
/// global/system collections. Performs no I/O.
pub fn tenant_filters(org_id: Uuid, collection: &str) -> Vec<Filter> {
    if is_tenant_scoped(collection) {
        vec![Filter::eq("org_id", org_id.to_string())]
    } else {
        Vec::new()
    }
}
