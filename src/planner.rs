use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};
use crate::pet::Pet;
use crate::registry::SharedRegistry;
use crate::task::{Task, TaskRef};

pub const PREFERRED_BONUS: i64 = 10;
pub const AVOIDED_PENALTY: i64 = 5;

/// Owner preferences applied when scoring tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub preferred_task_types: Vec<String>,
    #[serde(default)]
    pub avoided_task_types: Vec<String>,
    #[serde(default)]
    pub sort_by_time: bool,
}

impl Preferences {
    pub fn from_json_str(raw: &str) -> PlannerResult<Self> {
        let prefs: Preferences = serde_json::from_str(raw)
            .map_err(|err| PlannerError::invalid(format!("invalid preferences JSON: {err}")))?;
        Ok(prefs.normalized())
    }

    /// Trimmed, lowercased, blank-free type lists with duplicates dropped
    /// (first occurrence wins).
    pub fn normalized(self) -> Self {
        Self {
            preferred_task_types: normalize_types(self.preferred_task_types),
            avoided_task_types: normalize_types(self.avoided_task_types),
            sort_by_time: self.sort_by_time,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.preferred_task_types.is_empty()
            && self.avoided_task_types.is_empty()
            && !self.sort_by_time
    }

    pub fn prefers(&self, task_type: &str) -> bool {
        self.preferred_task_types.iter().any(|t| t == task_type)
    }

    pub fn avoids(&self, task_type: &str) -> bool {
        self.avoided_task_types.iter().any(|t| t == task_type)
    }

    /// Priority, plus the preferred bonus, minus the avoided penalty. A type
    /// listed in both gets both adjustments.
    pub fn score(&self, task: &Task) -> i64 {
        let mut score = i64::from(task.priority());
        if self.prefers(task.task_type()) {
            score += PREFERRED_BONUS;
        }
        if self.avoids(task.task_type()) {
            score -= AVOIDED_PENALTY;
        }
        score
    }
}

fn normalize_types(types: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(types.len());
    for raw in types {
        let t = raw.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Builds a daily plan for one pet from one registry.
///
/// Setup order is budget, then optional preferences, then
/// [`DailyPlanner::generate_plan`]. Each call to `generate_plan` re-runs the
/// whole selection against the current registry contents.
pub struct DailyPlanner {
    pet: Pet,
    registry: SharedRegistry,
    available_time: Option<i64>,
    preferences: Preferences,
    last_plan: Vec<TaskRef>,
    excluded: Vec<TaskRef>,
    generated: bool,
}

impl DailyPlanner {
    pub fn new(pet: Pet, registry: SharedRegistry) -> Self {
        Self {
            pet,
            registry,
            available_time: None,
            preferences: Preferences::default(),
            last_plan: Vec::new(),
            excluded: Vec::new(),
            generated: false,
        }
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn set_available_time(&mut self, minutes: i64) -> PlannerResult<()> {
        if minutes < 0 {
            return Err(PlannerError::invalid(format!(
                "available time cannot be negative (got {minutes})"
            )));
        }
        self.available_time = Some(minutes);
        Ok(())
    }

    pub fn available_time(&self) -> Option<i64> {
        self.available_time
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences.normalized();
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Priority-weighted greedy selection: score, sort by score (stable),
    /// then take each task that still fits the budget in a single pass.
    pub fn generate_plan(&mut self) -> PlannerResult<Vec<TaskRef>> {
        let budget = self.available_time.ok_or_else(|| {
            PlannerError::PreconditionViolation(
                "available time must be set before generating a plan".to_string(),
            )
        })?;

        let snapshot = self.registry.read().all_tasks();
        let mut scored: Vec<(i64, i64, TaskRef)> = snapshot
            .into_iter()
            .map(|task| {
                let (score, duration) = {
                    let t = task.read();
                    (self.preferences.score(&t), t.duration_minutes())
                };
                (score, duration, task)
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut accepted = Vec::new();
        let mut excluded = Vec::new();
        let mut used = 0;
        for (_, duration, task) in scored {
            if duration <= budget - used {
                used += duration;
                accepted.push(task);
            } else {
                excluded.push(task);
            }
        }

        if self.preferences.sort_by_time {
            accepted.sort_by_key(|task| task.read().time().to_string());
        }

        debug!(
            pet = %self.pet.name(),
            budget,
            used,
            accepted = accepted.len(),
            excluded = excluded.len(),
            "daily plan generated"
        );

        self.last_plan = accepted;
        self.excluded = excluded;
        self.generated = true;
        Ok(self.last_plan.clone())
    }

    pub fn last_plan(&self) -> Vec<TaskRef> {
        self.last_plan.clone()
    }

    pub fn excluded_tasks(&self) -> Vec<TaskRef> {
        self.excluded.clone()
    }

    pub fn has_plan(&self) -> bool {
        self.generated
    }

    pub fn clear_plan(&mut self) {
        self.last_plan.clear();
        self.excluded.clear();
        self.generated = false;
    }

    pub(crate) fn planned(&self) -> &[TaskRef] {
        &self.last_plan
    }

    pub(crate) fn unplanned(&self) -> &[TaskRef] {
        &self.excluded
    }

    pub(crate) fn used_minutes(&self) -> i64 {
        self.last_plan
            .iter()
            .map(|t| t.read().duration_minutes())
            .sum()
    }
}
