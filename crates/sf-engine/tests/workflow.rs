//! End-to-end workflow lifecycle tests: the shipping gate, progress
//! aggregation, and cascade behavior across the engine's public operations.

use std::sync::Arc;

use chrono::NaiveDate;
use sf_engine::{CreateProjectInput, WorkflowEngine};
use sf_models::{Department, ProcessPlan, ProcessStatus, ProjectStatus, Role, User};
use sf_store::{Collection, EntityStore, MemoryStore};
use sf_sync::DataContext;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn admin() -> User {
    User::new("admin", "System Administrator", Role::Admin, None)
}

fn engine_with_store() -> (WorkflowEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let data = Arc::new(DataContext::new(Arc::clone(&store) as Arc<dyn EntityStore>));
    (WorkflowEngine::new(data), store)
}

/// Two non-shipping steps (days 3 and 2, both starting at the project start)
/// plus the terminal shipping step; project runs 2024-01-01 to 2024-01-31.
fn three_step_input() -> CreateProjectInput {
    CreateProjectInput {
        name: "Packaging machine".into(),
        description: "Custom packaging machine build".into(),
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
                description: "Dispatch".into(),
                start_date: date("2024-01-25"),
                days: 1,
                is_shipping: true,
            },
        ],
    }
}

#[tokio::test]
async fn shipping_lifecycle_runs_to_project_completion() {
    let (engine, _) = engine_with_store();
    let admin = admin();
    let project = engine.create_project(&admin, three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);
    let shipping_id = processes[2].id.clone();

    // Freshly created: shipping is pending behind the gate.
    assert_eq!(
        engine.process_by_id(&shipping_id).unwrap().status,
        ProcessStatus::Pending
    );

    // Work both non-shipping steps to completion.
    for p in &processes[..2] {
        assert!(engine.assign_process(&admin, &p.id, "li", vec![]));
        assert!(engine.complete_process(&admin, &p.id));
    }

    // Dependencies met: shipping moved to waiting, not started.
    let shipping = engine.process_by_id(&shipping_id).unwrap();
    assert_eq!(shipping.status, ProcessStatus::Waiting);
    assert!(shipping.actual_start_date.is_none());
    assert!(engine.can_shipping_start(&project.id));

    // Assign and complete the shipping step.
    assert!(engine.assign_process(&admin, &shipping_id, "wang", vec![]));
    assert_eq!(
        engine.process_by_id(&shipping_id).unwrap().status,
        ProcessStatus::InProgress
    );
    assert!(engine.complete_process(&admin, &shipping_id));

    let project = engine.project_by_id(&project.id).unwrap();
    assert_eq!(project.status, ProjectStatus::Completed);
    assert_eq!(project.progress, 100);
    assert!(project.completed_at.is_some());
}

#[tokio::test]
async fn premature_shipping_assignment_is_refused() {
    let (engine, _) = engine_with_store();
    let admin = admin();
    let project = engine.create_project(&admin, three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);
    let shipping_id = processes[2].id.clone();

    // Only one of two prerequisites completed.
    engine.assign_process(&admin, &processes[0].id, "li", vec![]);
    engine.complete_process(&admin, &processes[0].id);

    assert!(!engine.assign_process(&admin, &shipping_id, "wang", vec![]));
    let shipping = engine.process_by_id(&shipping_id).unwrap();
    assert_eq!(shipping.status, ProcessStatus::Pending);
    assert!(shipping.main_employee_id.is_none());
}

#[tokio::test]
async fn gate_invariant_holds_throughout_lifecycle() {
    let (engine, _) = engine_with_store();
    let admin = admin();
    let project = engine.create_project(&admin, three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);

    let assert_gate = |engine: &WorkflowEngine| {
        let shipping = engine.process_by_id(&processes[2].id).unwrap();
        let siblings_done = engine
            .processes_for_project(&project.id)
            .iter()
            .filter(|p| !p.is_shipping_process)
            .all(|p| p.status == ProcessStatus::Completed);
        if matches!(
            shipping.status,
            ProcessStatus::InProgress | ProcessStatus::Completed
        ) {
            assert!(siblings_done, "shipping started before its gate opened");
        }
    };

    assert_gate(&engine);
    for p in &processes[..2] {
        engine.assign_process(&admin, &p.id, "li", vec![]);
        assert_gate(&engine);
        engine.complete_process(&admin, &p.id);
        assert_gate(&engine);
    }
    engine.assign_process(&admin, &processes[2].id, "wang", vec![]);
    assert_gate(&engine);
    engine.complete_process(&admin, &processes[2].id);
    assert_gate(&engine);
}

#[tokio::test]
async fn progress_is_monotonic_and_pinned_after_completion() {
    let (engine, _) = engine_with_store();
    let admin = admin();
    let project = engine.create_project(&admin, three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);

    let mut last_progress = engine.project_by_id(&project.id).unwrap().progress;
    for p in &processes[..2] {
        engine.assign_process(&admin, &p.id, "li", vec![]);
        engine.complete_process(&admin, &p.id);
        let progress = engine.project_by_id(&project.id).unwrap().progress;
        assert!(progress >= last_progress);
        last_progress = progress;
    }
    // Two of three processes done.
    assert_eq!(last_progress, 67);

    engine.assign_process(&admin, &processes[2].id, "wang", vec![]);
    engine.complete_process(&admin, &processes[2].id);
    assert_eq!(engine.project_by_id(&project.id).unwrap().progress, 100);

    // Completion pin: recomputation no longer moves the number. Two late
    // processes appear under the completed project (stale data from another
    // client); completing one re-runs the aggregation, which would yield 4/5
    // without the pin.
    {
        let mut state = engine.data().cache().write();
        for (order, name) in [(4, "Rework"), (5, "Extra QA")] {
            let mut extra = state.work_processes[0].clone();
            extra.id = format!("wp-{}-{}", project.id, order);
            extra.order = order;
            extra.name = name.into();
            extra.status = ProcessStatus::Waiting;
            extra.is_shipping_process = false;
            extra.main_employee_id = None;
            extra.completed_at = None;
            state.work_processes.push(extra);
        }
    }
    let late_id = format!("wp-{}-4", project.id);
    engine.assign_process(&admin, &late_id, "li", vec![]);
    engine.complete_process(&admin, &late_id);

    let pinned = engine.project_by_id(&project.id).unwrap();
    assert_eq!(pinned.progress, 100);
    assert_eq!(pinned.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn cross_department_assignment_requires_elevated_role() {
    let (engine, _) = engine_with_store();
    let project = engine.create_project(&admin(), three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);

    let electrical_manager = User::new(
        "dianqi",
        "Electrical Manager",
        Role::Manager,
        Some(Department::Electrical),
    );
    assert!(!engine.assign_process(&electrical_manager, &processes[0].id, "li", vec![]));

    let design_deputy = User::new(
        "fuzhi",
        "Design Deputy",
        Role::DeputyManager,
        Some(Department::Design),
    );
    assert!(engine.assign_process(&design_deputy, &processes[0].id, "li", vec![]));
}

#[tokio::test]
async fn cascade_delete_clears_dependents_in_cache_and_store() {
    let (engine, store) = engine_with_store();
    let admin = admin();
    let project = engine.create_project(&admin, three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);
    engine.assign_process(&admin, &processes[0].id, "li", vec![]);
    engine.add_daily_report(&admin, &processes[0].id, "day one", None);

    engine.delete_project(&project.id);
    assert!(engine.project_by_id(&project.id).is_none());
    assert!(engine.processes_for_project(&project.id).is_empty());
    assert!(engine.reports_for_project(&project.id).is_empty());

    // The spawned pushes are fire-and-forget; the explicit sync settles the
    // store to the cache's state.
    assert!(engine.data().sync_all().await);
    assert!(store.is_empty(Collection::Projects));
    assert!(store.is_empty(Collection::WorkProcesses));
    assert!(store.is_empty(Collection::DailyReports));
}

#[tokio::test]
async fn mutations_survive_offline_store_and_sync_later() {
    let (engine, store) = engine_with_store();
    let admin = admin();

    store.set_offline(true);
    let project = engine.create_project(&admin, three_step_input()).unwrap();
    let processes = engine.processes_for_project(&project.id);
    assert!(engine.assign_process(&admin, &processes[0].id, "li", vec![]));

    // Cache-only operation: the mutation is locally authoritative.
    assert_eq!(
        engine.process_by_id(&processes[0].id).unwrap().status,
        ProcessStatus::InProgress
    );

    store.set_offline(false);
    assert!(engine.data().sync_all().await);
    assert_eq!(store.len(Collection::Projects), 1);
    assert_eq!(store.len(Collection::WorkProcesses), 3);
}
