//! Project operations
//!
//! Creation materializes the work-process sequence from the caller-supplied
//! schedule; deletion cascades to processes and reports; progress is the
//! rounded share of completed processes, pinned at 100 once the project
//! completes.

use chrono::{Days, Utc};
use serde::Deserialize;
use sf_models::{
    ProcessPlan, ProcessStatus, Project, ProjectStatus, Role, User, WorkProcess,
};
use sf_store::Collection;
use sf_sync::CacheState;
use tracing::debug;
use validator::Validate;

use crate::WorkflowEngine;

/// Input for [`WorkflowEngine::create_project`].
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: String,
    #[validate(length(min = 1))]
    pub project_manager: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    #[validate(length(min = 1))]
    pub plans: Vec<ProcessPlan>,
}

impl CreateProjectInput {
    /// Plan-shape checks beyond field validation: every entry valid, exactly
    /// one shipping step, and the shipping step last in the sequence.
    fn plan_is_well_formed(&self) -> bool {
        if self.plans.iter().any(|plan| plan.validate().is_err()) {
            return false;
        }
        let shipping_count = self.plans.iter().filter(|p| p.is_shipping).count();
        shipping_count == 1 && self.plans.last().is_some_and(|p| p.is_shipping)
    }
}

impl WorkflowEngine {
    /// Create a project and materialize its work processes.
    ///
    /// Administrator-only; returns `None` for a non-admin caller or a
    /// malformed plan. Each process's planned end date is its start date plus
    /// `days - 1`, clipped to the project end date; the day count is kept as
    /// entered even when clipping shortens the window.
    pub fn create_project(&self, actor: &User, input: CreateProjectInput) -> Option<Project> {
        if actor.role != Role::Admin {
            debug!(actor = %actor.username, "create_project refused: not an administrator");
            return None;
        }
        if input.validate().is_err() || !input.plan_is_well_formed() {
            debug!("create_project refused: malformed plan");
            return None;
        }

        let project = Project::new(
            &input.name,
            &input.description,
            &input.project_manager,
            input.start_date,
            input.end_date,
            &actor.username,
        );

        let processes: Vec<WorkProcess> = input
            .plans
            .iter()
            .enumerate()
            .map(|(index, plan)| build_process(&project, plan, index as u32 + 1))
            .collect();

        {
            let mut state = self.data().cache().write();
            state.projects.push(project.clone());
            state.work_processes.extend(processes);
        }
        self.data()
            .push(&[Collection::Projects, Collection::WorkProcesses]);

        Some(project)
    }

    /// Delete a project together with its work processes and daily reports.
    pub fn delete_project(&self, project_id: &str) {
        {
            let mut state = self.data().cache().write();
            state.projects.retain(|p| p.id != project_id);
            state.work_processes.retain(|p| p.project_id != project_id);
            state.daily_reports.retain(|r| r.project_id != project_id);
        }
        self.data().push(&[
            Collection::Projects,
            Collection::WorkProcesses,
            Collection::DailyReports,
        ]);
    }

    pub fn projects(&self) -> Vec<Project> {
        self.data().cache().read().projects.clone()
    }

    pub fn project_by_id(&self, project_id: &str) -> Option<Project> {
        self.data()
            .cache()
            .read()
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
    }

    pub fn projects_by_status(&self, status: ProjectStatus) -> Vec<Project> {
        self.data()
            .cache()
            .read()
            .projects
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect()
    }
}

fn build_process(project: &Project, plan: &ProcessPlan, order: u32) -> WorkProcess {
    let computed_end = plan
        .start_date
        .checked_add_days(Days::new(u64::from(plan.days.saturating_sub(1))))
        .unwrap_or(plan.start_date);
    let planned_end = computed_end.min(project.end_date);

    let status = if plan.is_shipping {
        ProcessStatus::Pending
    } else {
        ProcessStatus::Waiting
    };

    WorkProcess {
        id: format!("wp-{}-{}", project.id, order),
        project_id: project.id.clone(),
        name: plan.name.clone(),
        description: plan.description.clone(),
        order,
        planned_days: plan.days,
        planned_start_date: plan.start_date,
        planned_end_date: planned_end,
        actual_start_date: None,
        actual_end_date: None,
        actual_days: None,
        status,
        department: plan.department,
        manager_id: None,
        main_employee_id: None,
        assistant_ids: Vec::new(),
        assigned_at: None,
        completed_at: None,
        is_shipping_process: plan.is_shipping,
    }
}

/// Recompute a project's progress from its processes.
///
/// A completed project stays pinned at 100 and is never recomputed.
pub(crate) fn recompute_progress(state: &mut CacheState, project_id: &str) {
    let Some(index) = state.projects.iter().position(|p| p.id == project_id) else {
        return;
    };
    if state.projects[index].is_completed() {
        return;
    }

    let (total, completed) = state
        .work_processes
        .iter()
        .filter(|p| p.project_id == project_id)
        .fold((0u32, 0u32), |(total, completed), p| {
            (total + 1, completed + u32::from(p.is_completed()))
        });

    state.projects[index].progress = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };
}

/// Mark a project completed, pinning progress and stamping the timestamp.
pub(crate) fn complete_project(state: &mut CacheState, project_id: &str) {
    if let Some(project) = state.projects.iter_mut().find(|p| p.id == project_id) {
        project.status = ProjectStatus::Completed;
        project.progress = 100;
        project.completed_at = Some(Utc::now());
    }
}
