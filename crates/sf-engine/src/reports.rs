//! Daily reports
//!
//! A report may be filed against a process by its main employee, one of its
//! assistants, or an admin/leader. Reports are immutable and only disappear
//! with their project.

use sf_core::today;
use sf_models::{DailyReport, User};
use sf_store::Collection;
use tracing::debug;

use crate::WorkflowEngine;

impl WorkflowEngine {
    /// File a daily report against a process. Content is required; `None`
    /// signals a refused report (unknown process, empty content, or an actor
    /// who is neither assigned nor elevated).
    pub fn add_daily_report(
        &self,
        actor: &User,
        process_id: &str,
        content: &str,
        feedback: Option<String>,
    ) -> Option<DailyReport> {
        if content.trim().is_empty() {
            debug!(process_id, "report refused: empty content");
            return None;
        }

        let report = {
            let mut state = self.data().cache().write();
            let Some(process) = state.work_processes.iter().find(|p| p.id == process_id) else {
                debug!(process_id, "report refused: no such process");
                return None;
            };
            if !actor.role.is_elevated() && !process.is_assigned_to(&actor.username) {
                debug!(actor = %actor.username, process_id, "report refused: not assigned");
                return None;
            }

            let report = DailyReport::new(
                process_id,
                process.project_id.clone(),
                actor.username.clone(),
                today(),
                content,
                feedback,
            );
            state.daily_reports.push(report.clone());
            report
        };

        self.data().push(&[Collection::DailyReports]);
        Some(report)
    }

    /// Reports for one process, newest date first.
    pub fn reports_for_process(&self, process_id: &str) -> Vec<DailyReport> {
        let mut reports: Vec<_> = self
            .data()
            .cache()
            .read()
            .daily_reports
            .iter()
            .filter(|r| r.process_id == process_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        reports
    }

    /// Reports across a whole project, newest date first.
    pub fn reports_for_project(&self, project_id: &str) -> Vec<DailyReport> {
        let mut reports: Vec<_> = self
            .data()
            .cache()
            .read()
            .daily_reports
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        reports
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use sf_models::Department;

    #[tokio::test]
    async fn test_report_requires_assignment() {
        let engine = engine();
        let project = engine.create_project(&admin(), three_step_input()).unwrap();
        let processes = engine.processes_for_project(&project.id);
        engine.assign_process(
            &manager(Department::Design),
            &processes[0].id,
            "li",
            vec!["chen".into()],
        );

        assert!(engine
            .add_daily_report(&employee("li", Department::Design), &processes[0].id, "milling done", None)
            .is_some());
        assert!(engine
            .add_daily_report(&employee("chen", Department::Design), &processes[0].id, "assisted", None)
            .is_some());
        // Unassigned employee is refused; admin is not.
        assert!(engine
            .add_daily_report(&employee("zhou", Department::Design), &processes[0].id, "nope", None)
            .is_none());
        assert!(engine
            .add_daily_report(&admin(), &processes[0].id, "inspection note", None)
            .is_some());
    }

    #[tokio::test]
    async fn test_report_content_is_required() {
        let engine = engine();
        let project = engine.create_project(&admin(), three_step_input()).unwrap();
        let processes = engine.processes_for_project(&project.id);

        assert!(engine
            .add_daily_report(&admin(), &processes[0].id, "   ", None)
            .is_none());
    }

    #[tokio::test]
    async fn test_report_denormalizes_project_id() {
        let engine = engine();
        let project = engine.create_project(&admin(), three_step_input()).unwrap();
        let processes = engine.processes_for_project(&project.id);

        let report = engine
            .add_daily_report(&admin(), &processes[1].id, "second step notes", Some("blocked on parts".into()))
            .unwrap();
        assert_eq!(report.project_id, project.id);
        assert_eq!(report.feedback.as_deref(), Some("blocked on parts"));

        assert_eq!(engine.reports_for_project(&project.id).len(), 1);
        assert_eq!(engine.reports_for_process(&processes[1].id).len(), 1);
        assert!(engine.reports_for_process(&processes[0].id).is_empty());
    }

    #[tokio::test]
    async fn test_report_on_unknown_process_is_refused() {
        let engine = engine();
        assert!(engine
            .add_daily_report(&admin(), "wp-missing-1", "content", None)
            .is_none());
    }
}
