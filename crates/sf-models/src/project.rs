//! Project model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sf_core::Id;
use uuid::Uuid;

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    Review,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Completed => "completed",
        }
    }
}

/// Project entity
///
/// A project owns an ordered sequence of work processes; its progress is the
/// rounded share of completed processes and is pinned at 100 once the project
/// itself completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    /// 0–100, derived from process completion
    pub progress: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Responsible person, free text
    pub project_manager: String,
    /// Username of the creating administrator
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        project_manager: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("p-{}", Uuid::new_v4().simple()),
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::Planning,
            progress: 0,
            start_date,
            end_date,
            project_manager: project_manager.into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProjectStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new(
            "CNC line",
            "Retrofit of line 3",
            "Zhao Min",
            "2024-01-01".parse().unwrap(),
            "2024-03-01".parse().unwrap(),
            "admin",
        );

        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.progress, 0);
        assert!(project.id.starts_with("p-"));
        assert!(project.completed_at.is_none());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::InProgress).unwrap(),
            serde_json::json!("in-progress")
        );
    }
}
