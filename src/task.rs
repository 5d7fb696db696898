use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime, NaiveTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlannerError, PlannerResult};
use crate::time;

/// Shared handle to a stored task. Edits made through one handle are visible
/// through every other handle, including ones held by a planner's last plan.
pub type TaskRef = Arc<RwLock<Task>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| PlannerError::invalid(format!("'{s}' is not a task id")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            other => Err(PlannerError::invalid(format!(
                "unknown recurrence '{other}' (expected none, daily or weekly)"
            ))),
        }
    }
}

/// Partial update applied by `TaskRegistry::edit_task`. Unset fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl TaskUpdate {
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.priority.is_none() && self.duration_minutes.is_none()
    }
}

/// A schedulable unit of pet care.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    time: String,
    #[serde(skip)]
    start: NaiveTime,
    priority: i32,
    duration_minutes: i64,
    task_type: String,
    recurrence: Recurrence,
    pet_id: Option<String>,
    completed: bool,
    completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(
        name: &str,
        description: &str,
        time: &str,
        priority: i32,
        duration_minutes: i64,
        task_type: &str,
    ) -> PlannerResult<Self> {
        let name = non_empty("name", name)?;
        let description = non_empty("description", description)?;
        let task_type = non_empty("type", task_type)?.to_lowercase();
        validate_priority(priority)?;
        validate_duration(duration_minutes)?;
        let start = time::parse_hhmm(time)?;

        Ok(Self {
            id: TaskId::new(),
            name,
            description,
            time: time.trim().to_string(),
            start,
            priority,
            duration_minutes,
            task_type,
            recurrence: Recurrence::None,
            pet_id: None,
            completed: false,
            completed_at: None,
        })
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Blank pet identifiers are treated as "no pet".
    pub fn with_pet(mut self, pet_id: Option<&str>) -> Self {
        self.pet_id = pet_id
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToOwned::to_owned);
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Raw `HH:MM` string as supplied.
    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    pub fn pet_id(&self) -> Option<&str> {
        self.pet_id.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<NaiveDateTime> {
        self.completed_at
    }

    pub fn set_time(&mut self, time: &str) -> PlannerResult<()> {
        self.start = time::parse_hhmm(time)?;
        self.time = time.trim().to_string();
        Ok(())
    }

    pub fn set_priority(&mut self, priority: i32) -> PlannerResult<()> {
        validate_priority(priority)?;
        self.priority = priority;
        Ok(())
    }

    pub fn set_duration(&mut self, minutes: i64) -> PlannerResult<()> {
        validate_duration(minutes)?;
        self.duration_minutes = minutes;
        Ok(())
    }

    /// Validates every supplied field before touching any of them.
    pub fn apply(&mut self, update: &TaskUpdate) -> PlannerResult<()> {
        if let Some(time) = update.time.as_deref() {
            time::parse_hhmm(time)?;
        }
        if let Some(priority) = update.priority {
            validate_priority(priority)?;
        }
        if let Some(minutes) = update.duration_minutes {
            validate_duration(minutes)?;
        }

        if let Some(time) = update.time.as_deref() {
            self.set_time(time)?;
        }
        if let Some(priority) = update.priority {
            self.set_priority(priority)?;
        }
        if let Some(minutes) = update.duration_minutes {
            self.set_duration(minutes)?;
        }
        Ok(())
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.completed_at = Some(Local::now().naive_local());
    }

    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    pub fn minutes_since_midnight(&self) -> i64 {
        time::minutes_since_midnight(self.start)
    }

    /// End offset in minutes since midnight. Not wrapped: a task running past
    /// midnight reports a value above 1440.
    pub fn end_minutes(&self) -> i64 {
        self.minutes_since_midnight() + self.duration_minutes
    }

    /// End as a time of day, or `None` when the task runs to or past midnight.
    pub fn end_time(&self) -> Option<NaiveTime> {
        time::time_from_minutes(self.end_minutes())
    }

    pub fn overlaps(&self, other: &Task) -> bool {
        self.id != other.id
            && time::intervals_overlap(
                self.minutes_since_midnight(),
                self.end_minutes(),
                other.minutes_since_midnight(),
                other.end_minutes(),
            )
    }

    /// The next instance of this task: same fields, fresh id, not completed.
    pub fn next_occurrence(&self) -> Self {
        Self {
            id: TaskId::new(),
            completed: false,
            completed_at: None,
            ..self.clone()
        }
    }

    pub fn into_ref(self) -> TaskRef {
        Arc::new(RwLock::new(self))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task(name='{}', type='{}', time='{}', priority={}, duration={}min)",
            self.name, self.task_type, self.time, self.priority, self.duration_minutes
        )
    }
}

fn non_empty(field: &str, value: &str) -> PlannerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::invalid(format!("task {field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn validate_priority(priority: i32) -> PlannerResult<()> {
    if priority < 0 {
        return Err(PlannerError::invalid(format!(
            "task priority cannot be negative (got {priority})"
        )));
    }
    Ok(())
}

fn validate_duration(minutes: i64) -> PlannerResult<()> {
    if minutes <= 0 {
        return Err(PlannerError::invalid(format!(
            "task duration must be positive (got {minutes})"
        )));
    }
    if minutes > time::MINUTES_PER_DAY {
        return Err(PlannerError::invalid(format!(
            "task duration cannot exceed {} minutes (got {minutes})",
            time::MINUTES_PER_DAY
        )));
    }
    Ok(())
}
