//! Permission and scope evaluation. Pure functions; no store access.

use adminjet_models::{scopes, OrganizationMember, ScopedApiKey};

use crate::api_keys::ApiKeyValidation;

fn grants(granted: &[String], requested: &str) -> bool {
    granted
        .iter()
        .any(|g| g == scopes::WILDCARD || g == requested)
}

/// Whether a member may perform an action. True iff the member's permission
/// set contains `permission` or the wildcard.
pub fn has_permission(member: &OrganizationMember, permission: &str) -> bool {
    grants(&member.permissions, permission)
}

/// Whether an API key carries a scope. Identical semantics applied to the
/// key's scope set.
pub fn has_scope(api_key: &ScopedApiKey, scope: &str) -> bool {
    grants(&api_key.scopes, scope)
}

/// Whether a validated credential carries any of the requested scopes.
pub fn has_any_scope(validation: &ApiKeyValidation, requested: &[&str]) -> bool {
    requested
        .iter()
        .any(|scope| has_scope(&validation.api_key, scope))
}

/// The requested scopes the credential does not carry. Safe to surface to
/// the caller, who already proved possession of a valid credential.
pub fn missing_scopes<'a>(api_key: &ScopedApiKey, requested: &[&'a str]) -> Vec<&'a str> {
    if api_key.scopes.iter().any(|s| s == scopes::WILDCARD) {
        return Vec::new();
    }
    requested
        .iter()
        .filter(|scope| !has_scope(api_key, scope))
        .copied()
        .collect()
}
