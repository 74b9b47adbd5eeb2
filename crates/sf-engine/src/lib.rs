//! # sf-engine
//!
//! The work-process workflow engine: project creation with per-process
//! schedules, assignment and completion with the shipping-dependency gate,
//! progress aggregation, cascading deletion, and daily reports.
//!
//! The engine operates purely on the client cache held by a
//! [`DataContext`](sf_sync::DataContext) and propagates every mutation to the
//! entity store as a whole-collection push. Business-rule refusals (missing
//! permission, closed gate, unknown entity) are reported as `false`/`None`
//! return values, never as errors.

pub mod processes;
pub mod projects;
pub mod queries;
pub mod reports;

use std::sync::Arc;

use sf_sync::DataContext;

pub use processes::*;
pub use projects::*;
pub use queries::*;
pub use reports::*;

/// The workflow engine.
///
/// Holds the explicit store handle; all operations take the acting user as a
/// parameter so permission checks never read ambient state.
pub struct WorkflowEngine {
    data: Arc<DataContext>,
}

impl WorkflowEngine {
    pub fn new(data: Arc<DataContext>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Arc<DataContext> {
        &self.data
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use sf_models::{Department, ProcessPlan, Role, User};
    use sf_store::MemoryStore;
    use sf_sync::DataContext;

    use crate::projects::CreateProjectInput;
    use crate::WorkflowEngine;

    pub fn engine() -> WorkflowEngine {
        WorkflowEngine::new(Arc::new(DataContext::new(Arc::new(MemoryStore::new()))))
    }

    pub fn admin() -> User {
        User::new("admin", "System Administrator", Role::Admin, None)
    }

    pub fn manager(department: Department) -> User {
        User::new(
            format!("{}_manager", department.as_str()),
            "Manager",
            Role::Manager,
            Some(department),
        )
    }

    pub fn employee(username: &str, department: Department) -> User {
        User::new(username, username, Role::Employee, Some(department))
    }

    pub fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Two non-shipping processes plus the terminal shipping step, the layout
    /// used by the lifecycle tests.
    pub fn three_step_input() -> CreateProjectInput {
        CreateProjectInput {
            name: "Line 3 retrofit".into(),
            description: "Retrofit of production line 3".into(),
            project_manager: "Zhao Min".into(),
            start_date: date("2024-01-01"),
            end_date: date("2024-01-31"),
            plans: vec![
                ProcessPlan {
                    name: "Design".into(),
                    department: Department::Design,
                    description: "Drawings".into(),
                    start_date: date("2024-01-01"),
                    days: 3,
                    is_shipping: false,
                },
                ProcessPlan {
                    name: "Production".into(),
                    department: Department::Production,
                    description: "Machining".into(),
                    start_date: date("2024-01-01"),
                    days: 2,
                    is_shipping: false,
                },
                ProcessPlan {
                    name: "Shipping".into(),
                    department: Department::Assembly,
                    description: "Packaging and dispatch".into(),
                    start_date: date("2024-01-20"),
                    days: 1,
                    is_shipping: true,
                },
            ],
        }
    }
}
