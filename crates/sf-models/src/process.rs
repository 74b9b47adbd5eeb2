//! Work process model
//!
//! One department's unit of work within a project's fixed sequence. The
//! terminal shipping process is gated on the completion of every other
//! process in the same project.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sf_core::Id;
use validator::Validate;

use crate::user::Department;

/// Work process status
///
/// `Pending` is the shipping process's initial state while its dependencies
/// are unmet; non-shipping processes start in `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessStatus {
    Pending,
    Waiting,
    InProgress,
    Completed,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

/// Work process entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkProcess {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
    pub description: String,
    /// 1-based position within the project's sequence
    pub order: u32,
    pub planned_days: u32,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_days: Option<i64>,
    pub status: ProcessStatus,
    pub department: Department,
    /// Username of the manager who made the assignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    /// Username of the main responsible employee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assistant_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_shipping_process: bool,
}

impl WorkProcess {
    /// Whether the given username is the main employee or an assistant.
    pub fn is_assigned_to(&self, username: &str) -> bool {
        self.main_employee_id.as_deref() == Some(username)
            || self.assistant_ids.iter().any(|a| a == username)
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProcessStatus::Completed
    }
}

/// Per-process schedule supplied when a project is created.
///
/// The computed end date is clipped to the project's end date; the day count
/// is kept as entered even when clipping shortens the window.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPlan {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub department: Department,
    pub description: String,
    pub start_date: NaiveDate,
    #[validate(range(min = 1))]
    pub days: u32,
    #[serde(default)]
    pub is_shipping: bool,
}

/// One step of the standard seven-process sequence.
#[derive(Debug, Clone, Copy)]
pub struct ProcessTemplate {
    pub name: &'static str,
    pub department: Department,
    pub description: &'static str,
    pub is_shipping: bool,
}

/// The standard department sequence. Shipping is owned by assembly and is
/// always the terminal step.
pub const STANDARD_PROCESSES: [ProcessTemplate; 7] = [
    ProcessTemplate {
        name: "Design",
        department: Department::Design,
        description: "Product and drawing design",
        is_shipping: false,
    },
    ProcessTemplate {
        name: "Procurement",
        department: Department::Procurement,
        description: "Purchase materials and components",
        is_shipping: false,
    },
    ProcessTemplate {
        name: "Production",
        department: Department::Production,
        description: "Part machining and pre-assembly",
        is_shipping: false,
    },
    ProcessTemplate {
        name: "Assembly",
        department: Department::Assembly,
        description: "Final product assembly",
        is_shipping: false,
    },
    ProcessTemplate {
        name: "Electrical",
        department: Department::Electrical,
        description: "Electrical system commissioning",
        is_shipping: false,
    },
    ProcessTemplate {
        name: "Quality",
        department: Department::Quality,
        description: "Inspection and testing",
        is_shipping: false,
    },
    ProcessTemplate {
        name: "Shipping",
        department: Department::Assembly,
        description: "Packaging and shipping preparation",
        is_shipping: true,
    },
];

impl ProcessPlan {
    /// Build a plan entry from a standard template step.
    pub fn from_template(template: &ProcessTemplate, start_date: NaiveDate, days: u32) -> Self {
        Self {
            name: template.name.to_string(),
            department: template.department,
            description: template.description.to_string(),
            start_date,
            days,
            is_shipping: template.is_shipping,
        }
    }
}
