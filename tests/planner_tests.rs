use pawpal_planner::{
    DailyPlanner, NewTask, Pet, PlannerError, Preferences, SharedRegistry, TaskRef, TaskRegistry,
};

fn max() -> Pet {
    Pet::new("Max", 3, "dog").unwrap()
}

fn names(tasks: &[TaskRef]) -> Vec<String> {
    tasks.iter().map(|t| t.read().name().to_string()).collect()
}

fn scenario_b() -> SharedRegistry {
    let registry = TaskRegistry::shared();
    {
        let mut reg = registry.write();
        for (name, time, priority, minutes) in [
            ("Morning Walk", "07:00", 10, 30),
            ("Breakfast", "08:00", 9, 10),
            ("Playtime", "12:00", 7, 45),
            ("Afternoon Walk", "15:00", 8, 20),
            ("Dinner", "18:00", 9, 10),
        ] {
            reg.create_task(NewTask::new(name, name, time, priority, minutes, "care"))
                .unwrap();
        }
    }
    registry
}

#[test]
fn generate_before_budget_is_a_precondition_violation() {
    let mut planner = DailyPlanner::new(max(), scenario_b());
    let err = planner.generate_plan().unwrap_err();
    assert!(matches!(err, PlannerError::PreconditionViolation(_)));
    assert!(!planner.has_plan());
}

#[test]
fn greedy_takes_highest_scores_until_budget_is_spent() {
    let mut planner = DailyPlanner::new(max(), scenario_b());
    planner.set_available_time(90).unwrap();

    let plan = planner.generate_plan().unwrap();
    assert_eq!(
        names(&plan),
        vec!["Morning Walk", "Breakfast", "Dinner", "Afternoon Walk"]
    );
    let used: i64 = plan.iter().map(|t| t.read().duration_minutes()).sum();
    assert_eq!(used, 70);
    assert_eq!(names(&planner.excluded_tasks()), vec!["Playtime"]);
}

#[test]
fn greedy_keeps_first_fit_even_when_suboptimal() {
    let registry = TaskRegistry::shared();
    {
        let mut reg = registry.write();
        reg.create_task(NewTask::new("Long", "Long", "07:00", 9, 40, "care"))
            .unwrap();
        reg.create_task(NewTask::new("Half A", "Half A", "08:00", 8, 30, "care"))
            .unwrap();
        reg.create_task(NewTask::new("Half B", "Half B", "09:00", 7, 30, "care"))
            .unwrap();
        reg.create_task(NewTask::new("Tiny", "Tiny", "10:00", 1, 20, "care"))
            .unwrap();
    }
    let mut planner = DailyPlanner::new(max(), registry);
    planner.set_available_time(60).unwrap();
    let plan = planner.generate_plan().unwrap();
    assert_eq!(names(&plan), vec!["Long", "Tiny"]);
    assert_eq!(names(&planner.excluded_tasks()), vec!["Half A", "Half B"]);
}

#[test]
fn preferred_type_outranks_higher_raw_priority() {
    let registry = TaskRegistry::shared();
    {
        let mut reg = registry.write();
        reg.create_task(NewTask::new("Vet call", "Call vet", "09:00", 9, 30, "admin"))
            .unwrap();
        reg.create_task(NewTask::new("Walk", "Park walk", "10:00", 5, 30, "walk"))
            .unwrap();
    }
    let mut planner = DailyPlanner::new(max(), registry);
    planner.set_available_time(30).unwrap();
    planner.set_preferences(Preferences {
        preferred_task_types: vec!["walk".into()],
        ..Preferences::default()
    });

    let plan = planner.generate_plan().unwrap();
    assert_eq!(names(&plan), vec!["Walk"]);
    assert_eq!(planner.preferences().score(&plan[0].read()), 15);
    assert_eq!(names(&planner.excluded_tasks()), vec!["Vet call"]);
}

#[test]
fn avoided_type_drops_below_equal_priority() {
    let registry = TaskRegistry::shared();
    {
        let mut reg = registry.write();
        reg.create_task(NewTask::new("Bath", "Bath", "09:00", 6, 20, "grooming"))
            .unwrap();
        reg.create_task(NewTask::new("Fetch", "Fetch", "10:00", 3, 20, "playtime"))
            .unwrap();
    }
    let mut planner = DailyPlanner::new(max(), registry);
    planner.set_available_time(20).unwrap();
    planner.set_preferences(Preferences {
        avoided_task_types: vec!["Grooming".into()],
        ..Preferences::default()
    });
    assert_eq!(names(&planner.generate_plan().unwrap()), vec!["Fetch"]);
}

#[test]
fn sort_by_time_reorders_accepted_tasks_only() {
    let mut planner = DailyPlanner::new(max(), scenario_b());
    planner.set_available_time(90).unwrap();
    planner.set_preferences(Preferences {
        sort_by_time: true,
        ..Preferences::default()
    });
    let plan = planner.generate_plan().unwrap();
    let times: Vec<String> = plan.iter().map(|t| t.read().time().to_string()).collect();
    assert_eq!(times, vec!["07:00", "08:00", "15:00", "18:00"]);
    assert_eq!(names(&planner.excluded_tasks()), vec!["Playtime"]);
}

#[test]
fn equal_scores_keep_registry_order() {
    let registry = TaskRegistry::shared();
    {
        let mut reg = registry.write();
        for name in ["c", "a", "b"] {
            reg.create_task(NewTask::new(name, name, "09:00", 4, 10, "care"))
                .unwrap();
        }
    }
    let mut planner = DailyPlanner::new(max(), registry);
    planner.set_available_time(100).unwrap();
    assert_eq!(names(&planner.generate_plan().unwrap()), vec!["c", "a", "b"]);
}

#[test]
fn regenerating_uses_current_registry_state() {
    let registry = scenario_b();
    let mut planner = DailyPlanner::new(max(), registry.clone());
    planner.set_available_time(90).unwrap();
    planner.generate_plan().unwrap();

    registry
        .write()
        .create_task(NewTask::new("Meds", "Pill", "06:00", 20, 20, "medication"))
        .unwrap();
    let plan = planner.generate_plan().unwrap();
    assert_eq!(names(&plan)[0], "Meds");
    assert_eq!(plan.len(), 5);
    assert_eq!(names(&planner.last_plan()), names(&plan));
    assert_eq!(names(&planner.excluded_tasks()), vec!["Playtime"]);
}

#[test]
fn last_plan_reflects_later_edits_through_shared_handles() {
    let registry = scenario_b();
    let mut planner = DailyPlanner::new(max(), registry.clone());
    planner.set_available_time(90).unwrap();
    let plan = planner.generate_plan().unwrap();

    let id = plan[0].read().id();
    registry.write().complete_task(id).unwrap();
    assert!(planner.last_plan()[0].read().is_completed());
}

#[test]
fn clear_plan_forgets_results() {
    let mut planner = DailyPlanner::new(max(), scenario_b());
    planner.set_available_time(90).unwrap();
    planner.generate_plan().unwrap();
    assert!(planner.has_plan());
    planner.clear_plan();
    assert!(!planner.has_plan());
    assert!(planner.last_plan().is_empty());
    assert!(planner.excluded_tasks().is_empty());
}

#[test]
fn empty_registry_yields_empty_plan() {
    let mut planner = DailyPlanner::new(max(), TaskRegistry::shared());
    planner.set_available_time(60).unwrap();
    assert!(planner.generate_plan().unwrap().is_empty());
    assert!(planner.excluded_tasks().is_empty());
    assert!(planner.has_plan());
}
