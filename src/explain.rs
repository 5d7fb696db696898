use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::planner::DailyPlanner;

pub const NO_PLAN_MESSAGE: &str = "No plan has been generated yet. Call generate_plan() first.";
const EXCLUDED_PREVIEW: usize = 5;

/// Structured view of the last generated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub pet_name: String,
    pub total_tasks: usize,
    pub total_time: i64,
    pub remaining_time: i64,
    pub tasks_excluded: usize,
    pub task_types: BTreeMap<String, usize>,
    pub time_utilization: f64,
}

impl PlanSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("tasks={}", self.total_tasks),
            format!("used={}min", self.total_time),
            format!("remaining={}min", self.remaining_time),
            format!("excluded={}", self.tasks_excluded),
            format!("utilization={:.1}%", self.time_utilization),
        ];
        if !self.task_types.is_empty() {
            let types = self
                .task_types
                .iter()
                .map(|(t, n)| format!("{t}:{n}"))
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("types={types}"));
        }
        parts.join(", ")
    }
}

impl DailyPlanner {
    pub fn summary(&self) -> PlanSummary {
        let budget = self.available_time().unwrap_or(0);
        let used = self.used_minutes();
        let mut task_types = BTreeMap::new();
        for task in self.planned() {
            *task_types
                .entry(task.read().task_type().to_string())
                .or_insert(0) += 1;
        }
        let time_utilization = if budget == 0 || self.planned().is_empty() {
            0.0
        } else {
            used as f64 / budget as f64 * 100.0
        };

        PlanSummary {
            pet_name: self.pet().name().to_string(),
            total_tasks: self.planned().len(),
            total_time: used,
            remaining_time: budget - used,
            tasks_excluded: self.unplanned().len(),
            task_types,
            time_utilization,
        }
    }

    /// Human-readable report of the last generated plan.
    pub fn explain(&self) -> String {
        if !self.has_plan() {
            return NO_PLAN_MESSAGE.to_string();
        }

        let pet = self.pet();
        let budget = self.available_time().unwrap_or(0);
        let used = self.used_minutes();
        let prefs = self.preferences();
        let mut lines = Vec::new();

        lines.push(format!("=== Daily Care Plan for {} ===", pet.name()));
        lines.push(format!(
            "Pet: {} ({}, {} years old)",
            pet.name(),
            pet.species(),
            pet.age()
        ));
        lines.push(format!("Available Time: {budget} minutes"));
        lines.push(String::new());
        lines.push(format!("Total Tasks Scheduled: {}", self.planned().len()));
        lines.push(format!("Total Time Used: {used} minutes"));
        lines.push(format!("Remaining Time: {} minutes", budget - used));
        lines.push(String::new());

        if self.planned().is_empty() {
            lines.push("No tasks could be scheduled within the available time.".to_string());
        } else {
            let order = if prefs.sort_by_time {
                "in scheduled time order"
            } else {
                "in priority order"
            };
            lines.push(format!("Selected Tasks ({order}):"));
            for (idx, task) in self.planned().iter().enumerate() {
                let task = task.read();
                lines.push(format!(
                    "  {}. {} [{}] - {} min, Priority: {}, Time: {}",
                    idx + 1,
                    task.name(),
                    task.task_type(),
                    task.duration_minutes(),
                    task.priority(),
                    task.time()
                ));
            }
        }

        if !prefs.is_empty() {
            lines.push(String::new());
            lines.push("Preferences Applied:".to_string());
            if !prefs.preferred_task_types.is_empty() {
                lines.push(format!(
                    "  - Preferred task types: {}",
                    prefs.preferred_task_types.join(", ")
                ));
            }
            if !prefs.avoided_task_types.is_empty() {
                lines.push(format!(
                    "  - Avoided task types: {}",
                    prefs.avoided_task_types.join(", ")
                ));
            }
            if prefs.sort_by_time {
                lines.push("  - Tasks sorted by scheduled time".to_string());
            }
        }

        let excluded = self.unplanned();
        if !excluded.is_empty() {
            lines.push(String::new());
            lines.push(format!("Tasks Not Scheduled ({}):", excluded.len()));
            lines.push("  (Excluded due to time constraints or low priority)".to_string());
            for task in excluded.iter().take(EXCLUDED_PREVIEW) {
                let task = task.read();
                lines.push(format!(
                    "  - {} ({} min, Priority: {})",
                    task.name(),
                    task.duration_minutes(),
                    task.priority()
                ));
            }
            if excluded.len() > EXCLUDED_PREVIEW {
                lines.push(format!(
                    "  ... and {} more",
                    excluded.len() - EXCLUDED_PREVIEW
                ));
            }
        }

        lines.push(String::new());
        lines.push("=== Optimization Strategy ===".to_string());
        lines.push("This plan was optimized using a priority-based greedy algorithm:".to_string());
        lines.push("1. Tasks scored by priority level".to_string());
        lines.push("2. Preferred task types received bonus points".to_string());
        lines.push("3. Tasks selected in order until time budget exhausted".to_string());
        lines.push("4. High-priority tasks scheduled first to ensure completion".to_string());

        lines.join("\n")
    }
}
