use std::fs;
use std::io::{self, Write};

use pawpal_planner::{
    DailyPlanner, NewTask, Pet, PlannerError, Preferences, Recurrence, TaskId, TaskRef,
    TaskRegistry, TaskUpdate, write_plan_csv, write_summary_json,
};
use tracing_subscriber::EnvFilter;

struct Session {
    registry: pawpal_planner::SharedRegistry,
    planner: DailyPlanner,
}

impl Session {
    fn new() -> Result<Self, PlannerError> {
        let registry = TaskRegistry::shared();
        let pet = Pet::new("Buddy", 1, "dog")?;
        let planner = DailyPlanner::new(pet, registry.clone());
        Ok(Self { registry, planner })
    }

    /// Swapping the pet keeps the budget and preferences already configured.
    fn set_pet(&mut self, pet: Pet) -> Result<(), PlannerError> {
        let mut planner = DailyPlanner::new(pet, self.registry.clone());
        if let Some(minutes) = self.planner.available_time() {
            planner.set_available_time(minutes)?;
        }
        planner.set_preferences(self.planner.preferences().clone());
        self.planner = planner;
        Ok(())
    }

    fn update_preferences<F>(&mut self, mutator: F)
    where
        F: FnOnce(&mut Preferences),
    {
        let mut prefs = self.planner.preferences().clone();
        mutator(&mut prefs);
        self.planner.set_preferences(prefs);
    }

    /// Accepts a full task id or `#n`, the 1-based position shown by `list`.
    fn resolve_id(&self, raw: &str) -> Result<TaskId, PlannerError> {
        if let Some(pos) = raw.strip_prefix('#') {
            let idx: usize = pos
                .parse()
                .map_err(|_| PlannerError::InvalidArgument(format!("'{raw}' is not a task reference")))?;
            let tasks = self.registry.read().all_tasks();
            return idx
                .checked_sub(1)
                .and_then(|i| tasks.get(i))
                .map(|t| t.read().id())
                .ok_or_else(|| {
                    PlannerError::InvalidArgument(format!("no task at position {idx}"))
                });
        }
        raw.parse()
    }
}

fn report_error(err: &PlannerError) {
    match err {
        PlannerError::InvalidArgument(msg) => println!("Invalid input: {msg}"),
        PlannerError::DuplicateTask { name, time } => println!(
            "Duplicate task: '{name}' already exists at {time} (append --force to add anyway)"
        ),
        PlannerError::PreconditionViolation(msg) => println!("Setup incomplete: {msg}"),
        PlannerError::NotFound(id) => println!("Not found: no task with id {id}"),
        PlannerError::Export(msg) => println!("Export failed: {msg}"),
    }
}

fn position_of(session: &Session, task: &TaskRef) -> Option<usize> {
    let id = task.read().id();
    session
        .registry
        .read()
        .all_tasks()
        .iter()
        .position(|t| t.read().id() == id)
        .map(|p| p + 1)
}

fn render_task_line(session: &Session, task: &TaskRef) -> String {
    let pos = position_of(session, task).map_or_else(|| "-".to_string(), |p| p.to_string());
    let task = task.read();
    let mut flags = Vec::new();
    if task.is_completed() {
        flags.push("done".to_string());
    }
    if task.is_recurring() {
        flags.push(task.recurrence().to_string());
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };
    format!(
        "[#{pos}] {} - {} [{}] {} min, priority {}, pet {}{} id={}",
        task.time(),
        task.name(),
        task.task_type(),
        task.duration_minutes(),
        task.priority(),
        task.pet_id().unwrap_or("-"),
        flags,
        task.id()
    )
}

fn print_tasks(session: &Session, tasks: &[TaskRef]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        println!("{}", render_task_line(session, task));
    }
}

fn parse_types_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn print_preferences(prefs: &Preferences) {
    println!("Preferred types    : {}", prefs.preferred_task_types.join(", "));
    println!("Avoided types      : {}", prefs.avoided_task_types.join(", "));
    println!("Sort by time       : {}", prefs.sort_by_time);
}

fn print_help() {
    println!(
        "Commands:\n  help                                     Show this help\n  pet <name> <species> <age>               Set the pet being planned for\n  add <name> <HH:MM> <priority> <minutes> <type> [recurrence] [pet] [--force]\n                                           Create a task (recurrence: none|daily|weekly)\n  list [time|type <t>|pet <p>|pending|completed|recurring|priority <n>]\n                                           List tasks\n  edit <id|#n> [time=HH:MM] [priority=N] [duration=N]\n                                           Update a task\n  delete <id|#n>                           Delete a task\n  done <id|#n>                             Complete a task (recurring tasks roll forward)\n  undo <id|#n>                             Mark a task incomplete\n  conflicts                                Show overlapping tasks\n  budget <minutes>                         Set available time\n  prefer <types_csv>                       Set preferred task types\n  avoid <types_csv>                        Set avoided task types\n  sortbytime <on|off>                      Order the plan by time\n  prefs show|load <json_path>              Show or load preferences\n  plan                                     Generate the daily plan\n  explain                                  Explain the last plan\n  summary                                  Summarize the last plan\n  export <csv|json>                        Write the last plan (csv) or summary (json) to stdout\n  total [pending]                          Total task minutes\n  quit|exit                                Exit"
    );
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pawpal_planner=error")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let mut session = match Session::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to start session: {e}");
            return;
        }
    };

    println!("PawPal Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "pet" => {
                let name = parts.next();
                let species = parts.next();
                let age = parts.next();
                match (name, species, age) {
                    (Some(name), Some(species), Some(age_s)) => {
                        let age: i64 = match age_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid age");
                                continue;
                            }
                        };
                        match Pet::new(name, age, species).and_then(|pet| session.set_pet(pet)) {
                            Ok(_) => {
                                let pet = session.planner.pet();
                                println!(
                                    "Planning for {} ({}, {} years old).",
                                    pet.name(),
                                    pet.species(),
                                    pet.age()
                                );
                            }
                            Err(e) => report_error(&e),
                        }
                    }
                    _ => println!("Usage: pet <name> <species> <age>"),
                }
            }
            "add" => {
                let args: Vec<&str> = parts.collect();
                let force = args.contains(&"--force");
                let args: Vec<&str> = args.into_iter().filter(|a| *a != "--force").collect();
                if args.len() < 5 {
                    println!(
                        "Usage: add <name> <HH:MM> <priority> <minutes> <type> [recurrence] [pet] [--force]"
                    );
                    continue;
                }
                let priority: i32 = match args[2].parse() {
                    Ok(v) => v,
                    Err(_) => {
                        println!("Invalid priority");
                        continue;
                    }
                };
                let minutes: i64 = match args[3].parse() {
                    Ok(v) => v,
                    Err(_) => {
                        println!("Invalid duration");
                        continue;
                    }
                };
                let recurrence = match args.get(5).map(|r| r.parse::<Recurrence>()) {
                    Some(Ok(r)) => r,
                    Some(Err(e)) => {
                        report_error(&e);
                        continue;
                    }
                    None => Recurrence::None,
                };
                let mut new = NewTask::new(args[0], args[0], args[1], priority, minutes, args[4])
                    .recurrence(recurrence)
                    .allow_duplicates(force)
                    .warn_conflicts(true);
                if let Some(pet) = args.get(6) {
                    new = new.pet(*pet);
                }
                let result = session.registry.write().create_task(new);
                match result {
                    Ok(created) => {
                        println!("Task added.");
                        println!("{}", render_task_line(&session, &created.task));
                        for conflict in &created.conflicts {
                            println!("  warning: {}", conflict.reason);
                        }
                    }
                    Err(e) => report_error(&e),
                }
            }
            "list" => {
                let tasks = {
                    let registry = session.registry.read();
                    match (parts.next(), parts.next()) {
                        (None, _) => Ok(registry.all_tasks()),
                        (Some("time"), _) => Ok(registry.tasks_sorted_by_time()),
                        (Some("type"), Some(t)) => Ok(registry.tasks_by_type(t)),
                        (Some("pet"), Some(p)) => Ok(registry.tasks_by_pet(p)),
                        (Some("pending"), _) => Ok(registry.pending_tasks()),
                        (Some("completed"), _) => Ok(registry.completed_tasks()),
                        (Some("recurring"), _) => Ok(registry.recurring_tasks()),
                        (Some("priority"), Some(n)) => match n.parse::<i32>() {
                            Ok(min) => Ok(registry.tasks_by_priority_at_least(min)),
                            Err(_) => Err("Invalid priority"),
                        },
                        _ => Err(
                            "Usage: list [time|type <t>|pet <p>|pending|completed|recurring|priority <n>]",
                        ),
                    }
                };
                match tasks {
                    Ok(tasks) => print_tasks(&session, &tasks),
                    Err(msg) => println!("{msg}"),
                }
            }
            "edit" => {
                let Some(id_s) = parts.next() else {
                    println!("Usage: edit <id|#n> [time=HH:MM] [priority=N] [duration=N]");
                    continue;
                };
                let id = match session.resolve_id(id_s) {
                    Ok(id) => id,
                    Err(e) => {
                        report_error(&e);
                        continue;
                    }
                };
                let mut update = TaskUpdate::default();
                let mut bad = None;
                for field in parts {
                    match field.split_once('=') {
                        Some(("time", v)) => update = update.time(v),
                        Some(("priority", v)) => match v.parse() {
                            Ok(p) => update = update.priority(p),
                            Err(_) => bad = Some(format!("Invalid priority '{v}'")),
                        },
                        Some(("duration", v)) => match v.parse() {
                            Ok(d) => update = update.duration_minutes(d),
                            Err(_) => bad = Some(format!("Invalid duration '{v}'")),
                        },
                        _ => bad = Some(format!("Unknown field '{field}'")),
                    }
                }
                if let Some(msg) = bad {
                    println!("{msg}");
                    continue;
                }
                if update.is_empty() {
                    println!("Nothing to update.");
                    continue;
                }
                let result = session.registry.write().edit_task(id, &update);
                match result {
                    Ok(task) => {
                        println!("Task updated.");
                        println!("{}", render_task_line(&session, &task));
                    }
                    Err(e) => report_error(&e),
                }
            }
            "delete" => match parts.next().map(|s| session.resolve_id(s)) {
                Some(Ok(id)) => {
                    if session.registry.write().delete_task(id) {
                        println!("Deleted task {id}.");
                    } else {
                        report_error(&PlannerError::NotFound(id));
                    }
                }
                Some(Err(e)) => report_error(&e),
                None => println!("Usage: delete <id|#n>"),
            },
            "done" => match parts.next().map(|s| session.resolve_id(s)) {
                Some(Ok(id)) => {
                    let result = session.registry.write().complete_and_roll(id);
                    match result {
                        Ok(Some(next)) => {
                            println!("Task completed. Next occurrence created:");
                            println!("{}", render_task_line(&session, &next));
                        }
                        Ok(None) => println!("Task completed."),
                        Err(e) => report_error(&e),
                    }
                }
                Some(Err(e)) => report_error(&e),
                None => println!("Usage: done <id|#n>"),
            },
            "undo" => match parts.next().map(|s| session.resolve_id(s)) {
                Some(Ok(id)) => {
                    let result = session.registry.write().reopen_task(id);
                    match result {
                        Ok(_) => println!("Task marked incomplete."),
                        Err(e) => report_error(&e),
                    }
                }
                Some(Err(e)) => report_error(&e),
                None => println!("Usage: undo <id|#n>"),
            },
            "conflicts" => {
                let conflicts = session.registry.read().all_conflicts();
                if conflicts.is_empty() {
                    println!("No conflicts.");
                } else {
                    println!("Found {} scheduling conflict(s):", conflicts.len());
                    for conflict in conflicts {
                        println!("  {}", conflict.reason);
                    }
                }
            }
            "budget" => match parts.next().map(str::parse::<i64>) {
                Some(Ok(minutes)) => match session.planner.set_available_time(minutes) {
                    Ok(_) => println!("Available time set to {minutes} minutes."),
                    Err(e) => report_error(&e),
                },
                Some(Err(_)) => println!("Invalid minutes"),
                None => println!("Usage: budget <minutes>"),
            },
            "prefer" | "avoid" => {
                let types = parts.next().map(parse_types_csv).unwrap_or_default();
                let preferred = cmd == "prefer";
                session.update_preferences(|prefs| {
                    if preferred {
                        prefs.preferred_task_types = types;
                    } else {
                        prefs.avoided_task_types = types;
                    }
                });
                print_preferences(session.planner.preferences());
            }
            "sortbytime" => match parts.next() {
                Some(v @ ("on" | "off")) => {
                    let on = v == "on";
                    session.update_preferences(|prefs| prefs.sort_by_time = on);
                    print_preferences(session.planner.preferences());
                }
                _ => println!("Usage: sortbytime <on|off>"),
            },
            "prefs" => match parts.next() {
                Some("show") | None => print_preferences(session.planner.preferences()),
                Some("load") => match parts.next() {
                    Some(path) => match fs::read_to_string(path) {
                        Ok(contents) => match Preferences::from_json_str(&contents) {
                            Ok(prefs) => {
                                session.planner.set_preferences(prefs);
                                println!("Preferences loaded from {path}.");
                                print_preferences(session.planner.preferences());
                            }
                            Err(e) => report_error(&e),
                        },
                        Err(e) => println!("Error reading {path}: {e}"),
                    },
                    None => println!("Usage: prefs load <json_path>"),
                },
                Some(other) => {
                    println!("Unknown prefs command '{other}'.");
                    println!("Usage: prefs show|load <json_path>");
                }
            },
            "plan" => match session.planner.generate_plan() {
                Ok(plan) => {
                    println!("Plan generated ({}).", session.planner.summary().to_cli_summary());
                    for (idx, task) in plan.iter().enumerate() {
                        let task = task.read();
                        println!(
                            "  {}. {} {} [{}] {} min",
                            idx + 1,
                            task.time(),
                            task.name(),
                            task.task_type(),
                            task.duration_minutes()
                        );
                    }
                }
                Err(e) => report_error(&e),
            },
            "explain" => println!("{}", session.planner.explain()),
            "summary" => println!("{}", session.planner.summary().to_cli_summary()),
            "export" => {
                let stdout = io::stdout();
                let result = match parts.next() {
                    Some("csv") => write_plan_csv(&session.planner.last_plan(), stdout.lock()),
                    Some("json") => {
                        let res = write_summary_json(&session.planner.summary(), stdout.lock());
                        println!();
                        res
                    }
                    _ => {
                        println!("Usage: export <csv|json>");
                        continue;
                    }
                };
                if let Err(e) = result {
                    report_error(&e);
                }
            }
            "total" => {
                let total = match parts.next() {
                    Some("pending") => session.registry.write().pending_duration(),
                    _ => session.registry.write().total_duration(true),
                };
                println!("Total duration: {total} minutes");
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
