//! Collection names and document file mapping

use serde::{Deserialize, Serialize};

/// The four store collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Users,
    Projects,
    WorkProcesses,
    DailyReports,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Projects,
        Collection::WorkProcesses,
        Collection::DailyReports,
    ];

    /// Document file name inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Users => "users.json",
            Self::Projects => "projects.json",
            Self::WorkProcesses => "processes.json",
            Self::DailyReports => "daily-reports.json",
        }
    }

    /// HTTP path segment under `/api/`.
    pub fn api_path(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
            Self::WorkProcesses => "processes",
            Self::DailyReports => "daily-reports",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
            Self::WorkProcesses => "workProcesses",
            Self::DailyReports => "dailyReports",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_distinct() {
        let mut names: Vec<_> = Collection::ALL.iter().map(|c| c.file_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
