// Tenant context and per-collection data scoping

pub mod context;
pub mod filter;

pub use context::TenantContext;
pub use filter::{is_tenant_scoped, tenant_filters, TENANT_SCOPED_COLLECTIONS};
