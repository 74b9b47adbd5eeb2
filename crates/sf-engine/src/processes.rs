//! Work-process lifecycle
//!
//! Assignment moves a process into work, completion closes it. The terminal
//! shipping process is gated: it cannot be assigned until every sibling
//! non-shipping process has completed, and completing it completes the
//! project.

use chrono::Utc;
use sf_core::{inclusive_days, today};
use sf_models::{ProcessStatus, ProjectStatus, User, WorkProcess};
use sf_store::Collection;
use sf_sync::CacheState;
use tracing::debug;

use crate::projects::{complete_project, recompute_progress};
use crate::WorkflowEngine;

/// The shipping gate: open iff every non-shipping process of the project has
/// completed. Evaluated fresh on every call, never cached.
pub(crate) fn shipping_gate_open(state: &CacheState, project_id: &str) -> bool {
    state
        .work_processes
        .iter()
        .filter(|p| p.project_id == project_id && !p.is_shipping_process)
        .all(WorkProcess::is_completed)
}

/// Move a still-pending shipping process to waiting once its dependencies are
/// met. Called after every sibling completion.
fn satisfy_shipping_dependency(state: &mut CacheState, project_id: &str) {
    if !shipping_gate_open(state, project_id) {
        return;
    }
    if let Some(shipping) = state
        .work_processes
        .iter_mut()
        .find(|p| p.project_id == project_id && p.is_shipping_process)
    {
        if shipping.status == ProcessStatus::Pending {
            shipping.status = ProcessStatus::Waiting;
        }
    }
}

impl WorkflowEngine {
    /// Whether the project's shipping process may be assigned and started.
    pub fn can_shipping_start(&self, project_id: &str) -> bool {
        shipping_gate_open(&self.data().cache().read(), project_id)
    }

    /// Assign a process to a main employee plus assistants.
    ///
    /// Requires an assigning role; managers and deputy managers may only
    /// assign within their own department. A shipping process is refused
    /// while its gate is closed, a completed process is always refused.
    /// Re-assigning an in-progress process changes the crew but keeps the
    /// original actual start date.
    pub fn assign_process(
        &self,
        actor: &User,
        process_id: &str,
        main_employee_id: &str,
        assistant_ids: Vec<String>,
    ) -> bool {
        if !actor.role.can_assign() {
            debug!(actor = %actor.username, process_id, "assign refused: role cannot assign");
            return false;
        }

        let mut promoted_project = false;
        {
            let mut state = self.data().cache().write();
            let Some(index) = state.work_processes.iter().position(|p| p.id == process_id)
            else {
                debug!(process_id, "assign refused: no such process");
                return false;
            };

            let process = &state.work_processes[index];
            if !actor.role.is_elevated() && actor.department != Some(process.department) {
                debug!(
                    actor = %actor.username,
                    department = process.department.as_str(),
                    "assign refused: wrong department"
                );
                return false;
            }
            if process.is_completed() {
                debug!(process_id, "assign refused: process already completed");
                return false;
            }
            if process.is_shipping_process && !shipping_gate_open(&state, &process.project_id) {
                debug!(process_id, "assign refused: shipping gate closed");
                return false;
            }

            let process = &mut state.work_processes[index];
            process.manager_id = Some(actor.username.clone());
            process.main_employee_id = Some(main_employee_id.to_string());
            process.assistant_ids = assistant_ids;
            process.assigned_at = Some(Utc::now());
            if process.status != ProcessStatus::InProgress {
                process.status = ProcessStatus::InProgress;
                process.actual_start_date = Some(today());
            }

            let project_id = process.project_id.clone();
            if let Some(project) = state.projects.iter_mut().find(|p| p.id == project_id) {
                if project.status == ProjectStatus::Planning {
                    project.status = ProjectStatus::InProgress;
                    promoted_project = true;
                }
            }
        }

        if promoted_project {
            self.data()
                .push(&[Collection::WorkProcesses, Collection::Projects]);
        } else {
            self.data().push(&[Collection::WorkProcesses]);
        }
        true
    }

    /// Complete an in-progress process.
    ///
    /// Allowed for the main employee, an assistant, or an admin/leader.
    /// Stamps the actual dates and inclusive day count, re-evaluates the
    /// shipping gate, and — when the shipping process itself completes —
    /// completes the project.
    pub fn complete_process(&self, actor: &User, process_id: &str) -> bool {
        {
            let mut state = self.data().cache().write();
            let Some(index) = state.work_processes.iter().position(|p| p.id == process_id)
            else {
                debug!(process_id, "complete refused: no such process");
                return false;
            };

            let process = &state.work_processes[index];
            if !actor.role.is_elevated() && !process.is_assigned_to(&actor.username) {
                debug!(actor = %actor.username, process_id, "complete refused: not assigned");
                return false;
            }
            if process.status != ProcessStatus::InProgress {
                debug!(
                    process_id,
                    status = process.status.as_str(),
                    "complete refused: process not in progress"
                );
                return false;
            }

            let process = &mut state.work_processes[index];
            let end = today();
            let start = process.actual_start_date.unwrap_or(end);
            process.actual_start_date = Some(start);
            process.actual_end_date = Some(end);
            process.actual_days = Some(inclusive_days(start, end));
            process.status = ProcessStatus::Completed;
            process.completed_at = Some(Utc::now());

            let project_id = process.project_id.clone();
            let is_shipping = process.is_shipping_process;

            satisfy_shipping_dependency(&mut state, &project_id);
            recompute_progress(&mut state, &project_id);
            if is_shipping {
                complete_project(&mut state, &project_id);
            }
        }

        self.data()
            .push(&[Collection::WorkProcesses, Collection::Projects]);
        true
    }

    pub fn process_by_id(&self, process_id: &str) -> Option<WorkProcess> {
        self.data()
            .cache()
            .read()
            .work_processes
            .iter()
            .find(|p| p.id == process_id)
            .cloned()
    }

    /// A project's processes in sequence order.
    pub fn processes_for_project(&self, project_id: &str) -> Vec<WorkProcess> {
        let mut processes: Vec<_> = self
            .data()
            .cache()
            .read()
            .work_processes
            .iter()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect();
        processes.sort_by_key(|p| p.order);
        processes
    }
}
