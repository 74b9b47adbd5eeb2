//! Department and employee work queues, readiness and statistics
//!
//! Read-only views the dashboards and department pages are built from.

use serde::Serialize;
use sf_models::{Department, ProcessStatus, Project, ProjectStatus, User, WorkProcess};

use crate::processes::shipping_gate_open;
use crate::WorkflowEngine;

/// A process joined with its owning project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithProcess {
    pub project: Project,
    pub process: WorkProcess,
}

/// Shipping gate summary for one project.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingReadiness {
    /// Non-shipping processes in the project
    pub total: usize,
    /// Of those, completed
    pub completed: usize,
    pub can_ship: bool,
}

/// Portfolio statistics for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub planning: usize,
    pub review: usize,
    pub average_progress: f64,
    pub total_processes: usize,
    pub completed_processes: usize,
    /// Share of all processes completed, 0–100
    pub overall_progress: u8,
}

impl WorkflowEngine {
    fn join_processes<F>(&self, mut keep: F) -> Vec<ProjectWithProcess>
    where
        F: FnMut(&WorkProcess) -> bool,
    {
        let state = self.data().cache().read();
        state
            .work_processes
            .iter()
            .filter(|p| keep(p))
            .filter_map(|process| {
                let project = state.projects.iter().find(|pr| pr.id == process.project_id)?;
                Some(ProjectWithProcess {
                    project: project.clone(),
                    process: process.clone(),
                })
            })
            .collect()
    }

    /// Unassigned work for a department's manager view.
    ///
    /// A shipping process only shows up once its gate has opened (it reached
    /// `waiting`); other processes show up while unassigned.
    pub fn department_unassigned(&self, department: Department) -> Vec<ProjectWithProcess> {
        self.join_processes(|p| {
            if p.department != department || p.main_employee_id.is_some() {
                return false;
            }
            if p.is_shipping_process {
                p.status == ProcessStatus::Waiting
            } else {
                matches!(p.status, ProcessStatus::Pending | ProcessStatus::Waiting)
            }
        })
    }

    /// Work currently in progress within a department.
    pub fn department_in_progress(&self, department: Department) -> Vec<ProjectWithProcess> {
        self.join_processes(|p| {
            p.department == department
                && p.status == ProcessStatus::InProgress
                && p.main_employee_id.is_some()
        })
    }

    /// Completed work within a department.
    pub fn department_completed(&self, department: Department) -> Vec<ProjectWithProcess> {
        self.join_processes(|p| p.department == department && p.is_completed())
    }

    /// An employee's open assignments (main or assistant).
    pub fn employee_pending_tasks(&self, username: &str) -> Vec<ProjectWithProcess> {
        self.join_processes(|p| p.is_assigned_to(username) && p.status == ProcessStatus::InProgress)
    }

    /// An employee's completed assignments.
    pub fn employee_completed_tasks(&self, username: &str) -> Vec<ProjectWithProcess> {
        self.join_processes(|p| p.is_assigned_to(username) && p.is_completed())
    }

    /// Non-shipping completion summary used by the shipping department view.
    pub fn shipping_readiness(&self, project_id: &str) -> ShippingReadiness {
        let state = self.data().cache().read();
        let non_shipping: Vec<_> = state
            .work_processes
            .iter()
            .filter(|p| p.project_id == project_id && !p.is_shipping_process)
            .collect();
        let completed = non_shipping.iter().filter(|p| p.is_completed()).count();
        ShippingReadiness {
            total: non_shipping.len(),
            completed,
            can_ship: shipping_gate_open(&state, project_id),
        }
    }

    /// Portfolio statistics across all projects and processes.
    pub fn project_stats(&self) -> ProjectStats {
        let state = self.data().cache().read();
        let projects = &state.projects;
        let processes = &state.work_processes;

        let total = projects.len();
        let by_status = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();

        let total_processes = processes.len();
        let completed_processes = processes.iter().filter(|p| p.is_completed()).count();

        ProjectStats {
            total,
            completed: by_status(ProjectStatus::Completed),
            in_progress: by_status(ProjectStatus::InProgress),
            planning: by_status(ProjectStatus::Planning),
            review: by_status(ProjectStatus::Review),
            average_progress: if total == 0 {
                0.0
            } else {
                projects.iter().map(|p| p.progress as f64).sum::<f64>() / total as f64
            },
            total_processes,
            completed_processes,
            overall_progress: if total_processes == 0 {
                0
            } else {
                ((completed_processes as f64 / total_processes as f64) * 100.0).round() as u8
            },
        }
    }

    /// Users of one department, read-only.
    pub fn department_employees(&self, department: Department) -> Vec<User> {
        self.data()
            .cache()
            .read()
            .users
            .iter()
            .filter(|u| u.department == Some(department))
            .map(User::sanitized)
            .collect()
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.data()
            .cache()
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .map(User::sanitized)
    }
}
