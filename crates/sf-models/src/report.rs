//! Daily report model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sf_core::Id;
use uuid::Uuid;

/// Daily work report, filed against a work process by someone assigned to it.
/// Immutable once created; removed only when the owning project is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub id: Id,
    pub process_id: Id,
    /// Denormalized from the process for project-level queries
    pub project_id: Id,
    pub employee_id: String,
    pub date: NaiveDate,
    /// Work summary, required
    pub content: String,
    /// Problem feedback, optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyReport {
    pub fn new(
        process_id: impl Into<Id>,
        project_id: impl Into<Id>,
        employee_id: impl Into<String>,
        date: NaiveDate,
        content: impl Into<String>,
        feedback: Option<String>,
    ) -> Self {
        Self {
            id: format!("dr-{}", Uuid::new_v4().simple()),
            process_id: process_id.into(),
            project_id: project_id.into(),
            employee_id: employee_id.into(),
            date,
            content: content.into(),
            feedback,
            created_at: Utc::now(),
        }
    }
}
