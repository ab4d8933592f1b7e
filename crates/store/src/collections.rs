//! Collection names used across the engine.

// System collections, scoped by the engine itself.
pub const ORGANIZATIONS: &str = "organizations";
pub const ORGANIZATION_MEMBERS: &str = "organization_members";
pub const API_KEYS: &str = "api_keys";

// Tenant-scoped collections, see `adminjet_tenant::filter`.
pub const CONTRACTS: &str = "contracts";
pub const CREDIT_APPLICATIONS: &str = "credit_applications";
pub const BACKUP_JOBS: &str = "backup_jobs";
pub const SECRET_ROTATION_JOBS: &str = "secret_rotation_jobs";
pub const AUDIT_LOGS: &str = "audit_logs";
