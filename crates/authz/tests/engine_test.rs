//! Integration tests for the authorization engine, run against the
//! in-memory document store.

use std::sync::Arc;

use adminjet_authz::{
    has_permission, has_scope, AuthzEngine, AuthzError, EngineConfig, IdentityResolver,
};
use adminjet_models::{
    CreateApiKeyRequest, CreateOrganizationRequest, MemberRole, Organization, Plan,
    SubscriptionStatus,
};
use adminjet_store::{collections, DocumentStore, MemoryStore};
use async_trait::async_trait;
use chrono::{Duration, Utc};

struct StaticResolver;

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve_email(&self, user_id: &str) -> Option<String> {
        Some(format!("{user_id}@example.com"))
    }
}

fn engine() -> (AuthzEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = AuthzEngine::new(
        store.clone(),
        Arc::new(StaticResolver),
        EngineConfig::default(),
    );
    (engine, store)
}

fn org_request(name: &str, slug: &str, plan: Plan) -> CreateOrganizationRequest {
    CreateOrganizationRequest {
        name: name.to_string(),
        slug: slug.to_string(),
        created_by: "u1".to_string(),
        description: None,
        plan: Some(plan),
        features: None,
    }
}

async fn create_org(engine: &AuthzEngine, slug: &str, plan: Plan) -> Organization {
    engine
        .organizations()
        .create_organization(org_request("Acme", slug, plan))
        .await
        .unwrap()
}

fn key_request(org: &Organization, name: &str, scopes: &[&str]) -> CreateApiKeyRequest {
    CreateApiKeyRequest {
        org_id: org.id,
        name: name.to_string(),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        created_by: "u1".to_string(),
        expires_at: None,
        rate_limits: None,
    }
}

#[tokio::test]
async fn plan_settings_are_deterministic() {
    let (engine, _) = engine();

    let pro = create_org(&engine, "acme", Plan::Pro).await;
    assert_eq!(pro.settings.max_users, 25);
    assert_eq!(pro.settings.max_api_keys, 5);
    assert_eq!(pro.settings.data_retention_days, 90);
    assert!(pro.settings.has_feature("webhook_access"));

    let free = create_org(&engine, "small", Plan::Free).await;
    assert_eq!(free.settings.max_users, 5);
    assert_eq!(free.settings.max_api_keys, 2);
    assert_eq!(free.settings.data_retention_days, 30);

    let enterprise = create_org(&engine, "mega", Plan::Enterprise).await;
    assert_eq!(enterprise.settings.max_users, 100);
    assert_eq!(enterprise.settings.max_api_keys, 20);
    assert_eq!(enterprise.settings.data_retention_days, 365);
    assert!(enterprise.settings.has_feature("backup_restore"));
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let (engine, _) = engine();
    create_org(&engine, "acme", Plan::Pro).await;

    let err = engine
        .organizations()
        .create_organization(org_request("Acme Two", "acme", Plan::Free))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::SlugTaken(slug) if slug == "acme"));
}

#[tokio::test]
async fn creator_becomes_owner_with_wildcard() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;

    let owner = engine.members().get_member(org.id, "u1").await.unwrap();
    assert_eq!(owner.role, MemberRole::Owner);
    assert_eq!(owner.permissions, vec!["*"]);
    assert_eq!(owner.email, "u1@example.com");

    let reloaded = engine.organizations().get_organization(org.id).await.unwrap();
    assert_eq!(reloaded.metadata.total_users, 1);
}

#[tokio::test]
async fn adding_the_same_member_twice_fails() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;

    engine
        .members()
        .add_member(org.id, "u2", MemberRole::Viewer, "u1", None)
        .await
        .unwrap();

    let reloaded = engine.organizations().get_organization(org.id).await.unwrap();
    assert_eq!(reloaded.metadata.total_users, 2);

    let err = engine
        .members()
        .add_member(org.id, "u2", MemberRole::Member, "u1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::AlreadyMember));

    // The failed add must not touch the counter.
    let reloaded = engine.organizations().get_organization(org.id).await.unwrap();
    assert_eq!(reloaded.metadata.total_users, 2);
}

#[tokio::test]
async fn member_limit_is_enforced() {
    let (engine, _) = engine();
    let org = create_org(&engine, "tiny", Plan::Free).await;

    // Free plan allows 5 members; the owner already holds one slot.
    for i in 2..=5 {
        engine
            .members()
            .add_member(org.id, &format!("u{i}"), MemberRole::Member, "u1", None)
            .await
            .unwrap();
    }

    let err = engine
        .members()
        .add_member(org.id, "u6", MemberRole::Member, "u1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::OrgFull { max_users: 5 }));
}

#[tokio::test]
async fn viewer_permissions_are_read_only() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;

    let viewer = engine
        .members()
        .add_member(org.id, "u2", MemberRole::Viewer, "u1", None)
        .await
        .unwrap();

    assert!(has_permission(&viewer, "org.read"));
    assert!(has_permission(&viewer, "data.read"));
    assert!(!has_permission(&viewer, "data.write"));
}

#[tokio::test]
async fn unresolved_emails_fall_back_to_placeholder() {
    let store = Arc::new(MemoryStore::new());
    let engine = AuthzEngine::with_defaults(store);
    let org = create_org(&engine, "acme", Plan::Pro).await;

    let member = engine
        .members()
        .add_member(org.id, "u2", MemberRole::Member, "u1", None)
        .await
        .unwrap();
    assert_eq!(member.email, "u2@unresolved.invalid");

    // An explicitly supplied address wins over the resolver.
    let member = engine
        .members()
        .add_member(org.id, "u3", MemberRole::Member, "u1", Some("u3@corp.test".into()))
        .await
        .unwrap();
    assert_eq!(member.email, "u3@corp.test");
}

#[tokio::test]
async fn issued_key_round_trips_through_validation() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;

    let issued = engine
        .api_keys()
        .create_api_key(key_request(&org, "ingest", &["data.read", "org.read"]))
        .await
        .unwrap();
    assert!(issued.raw_key.starts_with("aj_"));

    let validation = engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap();
    assert_eq!(validation.organization.id, org.id);
    assert_eq!(validation.api_key.id, issued.api_key.id);
    assert!(has_scope(&validation.api_key, "data.read"));
    assert!(has_scope(&validation.api_key, "org.read"));
    assert!(!has_scope(&validation.api_key, "data.write"));
    assert_eq!(validation.api_key.usage_stats.total_requests, 1);
    assert_eq!(validation.api_key.usage_stats.requests_today, 1);

    let validation = engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap();
    assert_eq!(validation.api_key.usage_stats.total_requests, 2);
    assert_eq!(validation.api_key.usage_stats.requests_today, 2);
}

#[tokio::test]
async fn raw_secret_is_never_persisted() {
    let (engine, store) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;

    let issued = engine
        .api_keys()
        .create_api_key(key_request(&org, "ingest", &["data.read"]))
        .await
        .unwrap();

    let document = store
        .get(collections::API_KEYS, &issued.api_key.id.to_string())
        .await
        .unwrap()
        .unwrap();
    let serialized = document.to_string();
    assert!(!serialized.contains(&issued.raw_key));

    assert_eq!(document["key_prefix"].as_str().unwrap().len(), 8);
    assert!(issued.raw_key.starts_with(document["key_prefix"].as_str().unwrap()));
    assert_ne!(document["key_hash"].as_str().unwrap(), issued.raw_key);
}

#[tokio::test]
async fn key_limit_is_enforced() {
    let (engine, _) = engine();
    let org = create_org(&engine, "tiny", Plan::Free).await;

    for name in ["first", "second"] {
        engine
            .api_keys()
            .create_api_key(key_request(&org, name, &["data.read"]))
            .await
            .unwrap();
    }

    let err = engine
        .api_keys()
        .create_api_key(key_request(&org, "third", &["data.read"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::OrgAtKeyLimit { max_api_keys: 2 }));
}

#[tokio::test]
async fn key_creation_requires_permission() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;
    engine
        .members()
        .add_member(org.id, "u2", MemberRole::Viewer, "u1", None)
        .await
        .unwrap();

    let mut request = key_request(&org, "ingest", &["data.read"]);
    request.created_by = "u2".to_string();
    let err = engine.api_keys().create_api_key(request).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)));

    // Same for a user with no membership at all.
    let mut request = key_request(&org, "ingest", &["data.read"]);
    request.created_by = "stranger".to_string();
    let err = engine.api_keys().create_api_key(request).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)));
}

#[tokio::test]
async fn expired_keys_transition_lazily() {
    let (engine, store) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;

    let mut request = key_request(&org, "stale", &["data.read"]);
    request.expires_at = Some(Utc::now() - Duration::hours(1));
    let issued = engine.api_keys().create_api_key(request).await.unwrap();

    let err = engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::CredentialExpired));

    // The transition is persisted, not just reported.
    let document = store
        .get(collections::API_KEYS, &issued.api_key.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(document["status"], "expired");

    // A replayed validation no longer matches an active key.
    let err = engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::Unauthenticated(_)));
}

#[tokio::test]
async fn inactive_subscription_rejects_requests_but_keeps_key_active() {
    let (engine, store) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;
    let issued = engine
        .api_keys()
        .create_api_key(key_request(&org, "ingest", &["data.read"]))
        .await
        .unwrap();

    engine
        .organizations()
        .update_subscription_status(org.id, SubscriptionStatus::Suspended, "u1")
        .await
        .unwrap();

    let err = engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::SubscriptionInactive));

    let document = store
        .get(collections::API_KEYS, &issued.api_key.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(document["status"], "active");
}

#[tokio::test]
async fn revoked_keys_stop_validating() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;
    let issued = engine
        .api_keys()
        .create_api_key(key_request(&org, "ingest", &["data.read"]))
        .await
        .unwrap();

    engine
        .api_keys()
        .revoke_api_key(org.id, issued.api_key.id, "u1")
        .await
        .unwrap();

    let err = engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::Unauthenticated(_)));

    let reloaded = engine.organizations().get_organization(org.id).await.unwrap();
    assert_eq!(reloaded.metadata.total_api_keys, 0);

    // Revocation is idempotent.
    engine
        .api_keys()
        .revoke_api_key(org.id, issued.api_key.id, "u1")
        .await
        .unwrap();
    let reloaded = engine.organizations().get_organization(org.id).await.unwrap();
    assert_eq!(reloaded.metadata.total_api_keys, 0);
}

#[tokio::test]
async fn removing_a_member_frees_a_slot() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;
    engine
        .members()
        .add_member(org.id, "u2", MemberRole::Member, "u1", None)
        .await
        .unwrap();

    engine.members().remove_member(org.id, "u2", "u1").await.unwrap();

    let err = engine.members().get_member(org.id, "u2").await.unwrap_err();
    assert!(matches!(err, AuthzError::NotMember));

    let reloaded = engine.organizations().get_organization(org.id).await.unwrap();
    assert_eq!(reloaded.metadata.total_users, 1);

    // The last owner cannot leave.
    let err = engine.members().remove_member(org.id, "u1", "u1").await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)));
}

#[tokio::test]
async fn role_change_rederives_permissions() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;
    engine
        .members()
        .add_member(org.id, "u2", MemberRole::Viewer, "u1", None)
        .await
        .unwrap();

    let updated = engine
        .members()
        .update_member_role(org.id, "u2", MemberRole::Admin, "u1")
        .await
        .unwrap();
    assert_eq!(updated.role, MemberRole::Admin);
    assert!(has_permission(&updated, "org.apikeys.create"));
    assert!(has_permission(&updated, "data.write"));
    assert!(!has_permission(&updated, "billing.write"));

    let reloaded = engine.members().get_member(org.id, "u2").await.unwrap();
    assert_eq!(reloaded.role, MemberRole::Admin);
}

#[tokio::test]
async fn platform_metrics_aggregate_the_fleet() {
    let (engine, _) = engine();

    let busy = create_org(&engine, "busy", Plan::Pro).await;
    engine
        .members()
        .add_member(busy.id, "u2", MemberRole::Member, "u1", None)
        .await
        .unwrap();
    let issued = engine
        .api_keys()
        .create_api_key(key_request(&busy, "ingest", &["data.read"]))
        .await
        .unwrap();
    engine
        .api_keys()
        .validate_api_key(&issued.raw_key, None)
        .await
        .unwrap();

    let quiet = create_org(&engine, "quiet", Plan::Free).await;
    engine
        .organizations()
        .update_subscription_status(quiet.id, SubscriptionStatus::Inactive, "u1")
        .await
        .unwrap();

    let metrics = engine.metrics().platform_metrics().await.unwrap();
    assert_eq!(metrics.total_organizations, 2);
    assert_eq!(metrics.active_organizations, 1);
    assert_eq!(metrics.total_members, 3);
    assert_eq!(metrics.total_api_keys, 1);
    assert_eq!(metrics.avg_members_per_organization, 1.5);
    assert_eq!(metrics.api_requests_24h, 1);

    // busy: 2 users * 10 + 1 key * 5 = 25; quiet: 1 user * 10 = 10.
    assert_eq!(metrics.top_organizations.len(), 2);
    assert_eq!(metrics.top_organizations[0].org_id, busy.id);
    assert_eq!(metrics.top_organizations[0].activity_score, 25);
    assert_eq!(metrics.top_organizations[1].activity_score, 10);
}

#[tokio::test]
async fn state_changes_leave_an_audit_trail() {
    let (engine, _) = engine();
    let org = create_org(&engine, "acme", Plan::Pro).await;
    engine
        .members()
        .add_member(org.id, "u2", MemberRole::Member, "u1", None)
        .await
        .unwrap();
    engine
        .api_keys()
        .create_api_key(key_request(&org, "ingest", &["data.read"]))
        .await
        .unwrap();

    let entries = engine.audit().query(org.id, None).await.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"organization_created"));
    assert!(actions.contains(&"member_added"));
    assert!(actions.contains(&"api_key_created"));
    assert!(entries.iter().all(|e| e.success));
}
