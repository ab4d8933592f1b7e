use std::sync::Arc;

use adminjet_models::AuditLogEntry;
use adminjet_store::{collections, DocumentStore, Filter};
use uuid::Uuid;

use crate::error::Result;

/// Append-only activity log. Entries are written for every state-changing
/// operation and never updated or deleted.
#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn DocumentStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, entry: AuditLogEntry) -> Result<()> {
        let document = serde_json::to_value(&entry).map_err(adminjet_store::StoreError::from)?;
        self.store.add(collections::AUDIT_LOGS, document).await?;
        tracing::debug!(
            org_id = %entry.org_id,
            action = %entry.action,
            success = entry.success,
            "audit entry appended"
        );
        Ok(())
    }

    /// Append without surfacing store failures to the caller. Used on error
    /// paths where the original failure must win; the append failure is
    /// still logged.
    pub async fn append_best_effort(&self, entry: AuditLogEntry) {
        let action = entry.action.clone();
        if let Err(e) = self.append(entry).await {
            tracing::error!(action = %action, error = %e, "failed to append audit entry");
        }
    }

    /// Recent entries for one organization, newest first.
    pub async fn query(&self, org_id: Uuid, limit: Option<usize>) -> Result<Vec<AuditLogEntry>> {
        let documents = self
            .store
            .query(
                collections::AUDIT_LOGS,
                &[Filter::eq("org_id", org_id.to_string())],
                None,
            )
            .await?;

        let mut entries: Vec<AuditLogEntry> = documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
