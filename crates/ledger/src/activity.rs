//! Activity-log integration.

use common::{ActivityLogId, CompanyId};
use domain::{ActivityLog, ActivityReference, ActivityType};
use serde_json::Value as JsonValue;
use store::ActivityLogRepository;

use crate::error::Result;

/// Appends activity entries and erases them during compensation.
#[derive(Debug, Clone)]
pub struct ActivityRecorder<A> {
    repo: A,
}

impl<A: ActivityLogRepository> ActivityRecorder<A> {
    /// Creates a recorder over the given repository.
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Appends an entry and returns its id for later compensation.
    pub async fn record(
        &self,
        company_id: CompanyId,
        activity_type: ActivityType,
        description: impl Into<String>,
        reference: Option<ActivityReference>,
        metadata: JsonValue,
    ) -> Result<ActivityLogId> {
        let entry = ActivityLog::new(company_id, activity_type, description, reference, metadata);
        let id = entry.id;
        tracing::debug!(%id, kind = %activity_type, "recording activity");
        self.repo.append(entry).await?;
        Ok(id)
    }

    /// Erases a previously recorded entry. Compensation-only.
    pub async fn erase(&self, company_id: CompanyId, id: ActivityLogId) -> Result<()> {
        self.repo.delete(company_id, id).await?;
        Ok(())
    }
}
