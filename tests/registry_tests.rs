use std::sync::Arc;

use pawpal_planner::{
    DailyPlanner, NewTask, Pet, PlannerError, Recurrence, TaskId, TaskRegistry, TaskUpdate,
};

fn times(tasks: &[pawpal_planner::TaskRef]) -> Vec<String> {
    tasks.iter().map(|t| t.read().time().to_string()).collect()
}

fn scenario_a() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    for (name, time, minutes) in [
        ("Dinner", "18:00", 10),
        ("Playtime", "12:00", 45),
        ("Morning Walk", "07:00", 30),
        ("Afternoon Walk", "15:00", 20),
        ("Breakfast", "08:00", 10),
    ] {
        registry
            .create_task(NewTask::new(name, name, time, 5, minutes, "care"))
            .unwrap();
    }
    registry
}

#[test]
fn sorted_by_time_orders_out_of_order_inserts() {
    let registry = scenario_a();
    assert_eq!(
        times(&registry.tasks_sorted_by_time()),
        vec!["07:00", "08:00", "12:00", "15:00", "18:00"]
    );
    assert_eq!(times(&registry.all_tasks())[0], "18:00");
}

#[test]
fn sorted_by_time_keeps_insertion_order_on_ties() {
    let mut registry = TaskRegistry::new();
    for name in ["first", "second", "third"] {
        registry
            .create_task(NewTask::new(name, name, "09:00", 1, 5, "feed"))
            .unwrap();
    }
    registry
        .create_task(NewTask::new("early", "early", "06:00", 1, 5, "feed"))
        .unwrap();

    let names: Vec<String> = registry
        .tasks_sorted_by_time()
        .iter()
        .map(|t| t.read().name().to_string())
        .collect();
    assert_eq!(names, vec!["early", "first", "second", "third"]);
}

#[test]
fn huge_duration_is_rejected_before_any_arithmetic() {
    let mut registry = TaskRegistry::new();
    let err = registry
        .create_task(NewTask::new("a", "a", "07:00", 1, i64::MAX, "x"))
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidArgument(_)));

    registry
        .create_task(NewTask::new("sitter", "sitter", "23:59", 1, 1440, "care"))
        .unwrap();
    registry
        .create_task(NewTask::new("walk", "walk", "07:00", 2, 30, "walk"))
        .unwrap();
    let id = registry.all_tasks()[1].read().id();
    assert!(
        registry
            .edit_task(id, &TaskUpdate::default().duration_minutes(i64::MAX))
            .is_err()
    );

    assert!(registry.all_conflicts().is_empty());
    assert_eq!(registry.total_duration(true), 1470);

    let shared = registry.into_shared();
    let mut planner = DailyPlanner::new(Pet::new("Max", 3, "dog").unwrap(), shared);
    planner.set_available_time(i64::MAX).unwrap();
    assert_eq!(planner.generate_plan().unwrap().len(), 2);
    planner.set_available_time(100).unwrap();
    let plan = planner.generate_plan().unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].read().name(), "walk");
}

#[test]
fn invalid_create_never_mutates_registry() {
    let mut registry = scenario_a();
    for bad in [
        NewTask::new("", "desc", "09:00", 1, 10, "walk"),
        NewTask::new("Walk", "desc", "09:00", 1, 0, "walk"),
        NewTask::new("Walk", "desc", "09:00", 1, i64::MAX, "walk"),
        NewTask::new("Walk", "desc", "9am", 1, 10, "walk"),
    ] {
        let err = registry.create_task(bad).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument(_)));
    }
    assert_eq!(registry.len(), 5);
    assert_eq!(registry.total_duration(true), 115);
}

#[test]
fn has_duplicate_matches_exact_name_and_time() {
    let mut registry = TaskRegistry::new();
    registry
        .create_task(NewTask::new("Feed", "Breakfast", "08:00", 5, 10, "feed"))
        .unwrap();

    assert!(registry.has_duplicate("Feed", "08:00"));
    assert!(!registry.has_duplicate("feed", "08:00"));
    assert!(!registry.has_duplicate("Feed", "08:01"));

    let err = registry
        .create_task(NewTask::new("Feed", "Feed again", "08:00", 3, 5, "feed"))
        .unwrap_err();
    match err {
        PlannerError::DuplicateTask { name, time } => {
            assert_eq!(name, "Feed");
            assert_eq!(time, "08:00");
        }
        other => panic!("expected DuplicateTask, got {other:?}"),
    }
}

#[test]
fn filters_return_expected_subsets() {
    let mut registry = TaskRegistry::new();
    registry
        .create_task(
            NewTask::new("Walk", "Walk", "07:00", 8, 30, "Walk")
                .recurrence(Recurrence::Daily)
                .pet("Max"),
        )
        .unwrap();
    let meds = registry
        .create_task(NewTask::new("Meds", "Pill", "12:00", 9, 5, "medication").pet("Luna"))
        .unwrap()
        .task;
    registry
        .create_task(NewTask::new("Brush", "Brush", "14:00", 2, 15, "grooming").pet("Max"))
        .unwrap();

    assert_eq!(registry.tasks_by_type("WALK").len(), 1);
    assert_eq!(registry.tasks_by_type("wal").len(), 0);
    assert_eq!(registry.tasks_by_priority_at_least(8).len(), 2);
    assert_eq!(registry.tasks_by_pet("Max").len(), 2);
    assert_eq!(registry.recurring_tasks().len(), 1);

    meds.write().mark_completed();
    assert_eq!(registry.completed_tasks().len(), 1);
    assert_eq!(registry.pending_tasks().len(), 2);
}

#[test]
fn query_results_are_fresh_but_tasks_are_shared() {
    let mut registry = scenario_a();
    let mut listed = registry.all_tasks();
    listed.clear();
    assert_eq!(registry.len(), 5);

    let first = registry.all_tasks().remove(0);
    let id = first.read().id();
    registry
        .edit_task(id, &TaskUpdate::default().priority(42))
        .unwrap();
    assert_eq!(first.read().priority(), 42);
    assert!(Arc::ptr_eq(&first, &registry.get_task(id).unwrap()));
}

#[test]
fn edit_unknown_id_is_not_found() {
    let mut registry = scenario_a();
    let missing = TaskId::new();
    let err = registry
        .edit_task(missing, &TaskUpdate::default().priority(1))
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound(id) if id == missing));
    assert!(matches!(
        registry.complete_and_roll(missing),
        Err(PlannerError::NotFound(_))
    ));
}

#[test]
fn invalid_edit_propagates_and_keeps_values() {
    let mut registry = scenario_a();
    let task = registry.all_tasks().remove(0);
    let id = task.read().id();
    let err = registry
        .edit_task(id, &TaskUpdate::default().time("07:30").duration_minutes(-1))
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidArgument(_)));
    assert_eq!(task.read().time(), "18:00");
}

#[test]
fn delete_reports_whether_anything_was_removed() {
    let mut registry = scenario_a();
    let id = registry.all_tasks()[0].read().id();
    assert!(registry.delete_task(id));
    assert!(!registry.delete_task(id));
    assert_eq!(registry.len(), 4);
    assert!(registry.get_task(id).is_none());
}

#[test]
fn completing_recurring_task_rolls_next_instance() {
    let mut registry = TaskRegistry::new();
    let daily = registry
        .create_task(
            NewTask::new("Walk", "Daily walk", "09:00", 5, 20, "walk")
                .recurrence(Recurrence::Daily)
                .pet("Max"),
        )
        .unwrap()
        .task;
    let id = daily.read().id();

    let next = registry.complete_and_roll(id).unwrap().expect("next instance");
    assert!(daily.read().is_completed());
    assert_eq!(registry.len(), 2);

    let next = next.read();
    assert_ne!(next.id(), id);
    assert!(!next.is_completed());
    assert_eq!(next.recurrence(), Recurrence::Daily);
    assert_eq!(next.name(), "Walk");
    assert_eq!(next.time(), "09:00");
    assert_eq!(next.pet_id(), Some("Max"));
}

#[test]
fn completing_one_off_task_does_not_grow_registry() {
    let mut registry = scenario_a();
    let id = registry.all_tasks()[0].read().id();
    assert!(registry.complete_and_roll(id).unwrap().is_none());
    assert_eq!(registry.len(), 5);
    assert!(registry.get_task(id).unwrap().read().is_completed());
}

#[test]
fn weekly_roll_bypasses_duplicate_check() {
    let mut registry = TaskRegistry::new();
    let weekly = registry
        .create_task(
            NewTask::new("Bath", "Bath time", "10:00", 3, 30, "grooming")
                .recurrence(Recurrence::Weekly),
        )
        .unwrap()
        .task;
    let id = weekly.read().id();
    registry.complete_and_roll(id).unwrap();
    assert!(registry.has_duplicate("Bath", "10:00"));
    assert_eq!(registry.tasks_by_type("grooming").len(), 2);
    assert_eq!(registry.total_duration(true), 60);
    assert_eq!(registry.total_duration(false), 30);
}

#[test]
fn reopen_clears_completion() {
    let mut registry = scenario_a();
    let id = registry.all_tasks()[1].read().id();
    registry.complete_task(id).unwrap();
    assert_eq!(registry.completed_tasks().len(), 1);
    registry.reopen_task(id).unwrap();
    assert!(registry.completed_tasks().is_empty());
}
