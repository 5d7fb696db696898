use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::conflict::Conflict;
use crate::error::{PlannerError, PlannerResult};
use crate::task::{Recurrence, Task, TaskId, TaskRef, TaskUpdate};

/// Registry shared between a session's callers and its planners. The lock is
/// the single exclusion region guarding the task map and the duration cache.
pub type SharedRegistry = Arc<RwLock<TaskRegistry>>;

/// Field record consumed by [`TaskRegistry::create_task`].
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub time: String,
    pub priority: i32,
    pub duration_minutes: i64,
    pub task_type: String,
    pub recurrence: Recurrence,
    pub pet_id: Option<String>,
    pub allow_duplicates: bool,
    pub warn_conflicts: bool,
}

/// Result of [`TaskRegistry::create_task`]. `conflicts` lists every existing
/// task the new one overlaps and is only filled when `warn_conflicts` is set.
#[derive(Debug, Clone)]
pub struct CreatedTask {
    pub task: TaskRef,
    pub conflicts: Vec<Conflict>,
}

impl NewTask {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
        priority: i32,
        duration_minutes: i64,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            time: time.into(),
            priority,
            duration_minutes,
            task_type: task_type.into(),
            recurrence: Recurrence::None,
            pet_id: None,
            allow_duplicates: false,
            warn_conflicts: false,
        }
    }

    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn pet(mut self, pet_id: impl Into<String>) -> Self {
        self.pet_id = Some(pet_id.into());
        self
    }

    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    pub fn warn_conflicts(mut self, warn: bool) -> Self {
        self.warn_conflicts = warn;
        self
    }

    fn build(&self) -> PlannerResult<Task> {
        Ok(Task::new(
            &self.name,
            &self.description,
            &self.time,
            self.priority,
            self.duration_minutes,
            &self.task_type,
        )?
        .with_recurrence(self.recurrence)
        .with_pet(self.pet_id.as_deref()))
    }
}

/// Authoritative in-memory store of a session's tasks, kept in insertion
/// order.
///
/// The cached total duration is dropped whenever a task is added, removed or
/// has its duration changed through [`TaskRegistry::edit_task`]. Completion
/// changes do not touch it, and the pending-only total is always recomputed.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: IndexMap<TaskId, TaskRef>,
    duration_cache: Option<i64>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn create_task(&mut self, new: NewTask) -> PlannerResult<CreatedTask> {
        if !new.allow_duplicates && self.has_duplicate(new.name.trim(), new.time.trim()) {
            return Err(PlannerError::DuplicateTask {
                name: new.name.trim().to_string(),
                time: new.time.trim().to_string(),
            });
        }

        let task = new.build()?.into_ref();
        self.insert(task.clone());

        let conflicts = if new.warn_conflicts {
            self.conflicts_for(&task)
        } else {
            Vec::new()
        };
        for conflict in &conflicts {
            let (first, second) = conflict.task_ids();
            warn!(
                task_id = %first,
                other_id = %second,
                kind = ?conflict.kind,
                "{}",
                conflict.reason
            );
        }
        Ok(CreatedTask { task, conflicts })
    }

    fn insert(&mut self, task: TaskRef) {
        let (id, name, time) = {
            let t = task.read();
            (t.id(), t.name().to_string(), t.time().to_string())
        };
        self.tasks.insert(id, task);
        self.duration_cache = None;
        debug!(task_id = %id, name = %name, time = %time, "task created");
    }

    pub fn edit_task(&mut self, id: TaskId, update: &TaskUpdate) -> PlannerResult<TaskRef> {
        let task = self.get_task(id).ok_or(PlannerError::NotFound(id))?;
        task.write().apply(update)?;
        if update.duration_minutes.is_some() {
            self.duration_cache = None;
        }
        debug!(task_id = %id, ?update, "task edited");
        Ok(task)
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let removed = self.tasks.shift_remove(&id).is_some();
        if removed {
            self.duration_cache = None;
            debug!(task_id = %id, "task deleted");
        }
        removed
    }

    pub fn get_task(&self, id: TaskId) -> Option<TaskRef> {
        self.tasks.get(&id).cloned()
    }

    pub fn has_duplicate(&self, name: &str, time: &str) -> bool {
        self.tasks.values().any(|task| {
            let task = task.read();
            task.name() == name && task.time() == time
        })
    }

    fn collect_where<F>(&self, predicate: F) -> Vec<TaskRef>
    where
        F: Fn(&Task) -> bool,
    {
        self.tasks
            .values()
            .filter(|task| predicate(&*task.read()))
            .cloned()
            .collect()
    }

    pub fn all_tasks(&self) -> Vec<TaskRef> {
        self.tasks.values().cloned().collect()
    }

    pub fn tasks_by_type(&self, task_type: &str) -> Vec<TaskRef> {
        let wanted = task_type.trim().to_lowercase();
        self.collect_where(|t| t.task_type() == wanted)
    }

    pub fn tasks_by_priority_at_least(&self, min_priority: i32) -> Vec<TaskRef> {
        self.collect_where(|t| t.priority() >= min_priority)
    }

    pub fn completed_tasks(&self) -> Vec<TaskRef> {
        self.collect_where(Task::is_completed)
    }

    pub fn pending_tasks(&self) -> Vec<TaskRef> {
        self.collect_where(|t| !t.is_completed())
    }

    pub fn recurring_tasks(&self) -> Vec<TaskRef> {
        self.collect_where(Task::is_recurring)
    }

    pub fn tasks_by_pet(&self, pet_id: &str) -> Vec<TaskRef> {
        self.collect_where(|t| t.pet_id() == Some(pet_id))
    }

    /// Stable sort by time of day; ties keep insertion order.
    pub fn tasks_sorted_by_time(&self) -> Vec<TaskRef> {
        let mut tasks = self.all_tasks();
        tasks.sort_by_key(|task| task.read().minutes_since_midnight());
        tasks
    }

    /// Every stored task overlapping `task`, excluding `task` itself.
    pub fn conflicts_for(&self, task: &TaskRef) -> Vec<Conflict> {
        self.tasks
            .values()
            .filter_map(|other| Conflict::detect(task, other))
            .collect()
    }

    /// Every overlapping unordered pair, each reported once.
    pub fn all_conflicts(&self) -> Vec<Conflict> {
        let snapshot = self.all_tasks();
        let mut conflicts = Vec::new();
        for (i, first) in snapshot.iter().enumerate() {
            for second in &snapshot[i + 1..] {
                if let Some(conflict) = Conflict::detect(first, second) {
                    conflicts.push(conflict);
                }
            }
        }
        conflicts
    }

    pub fn complete_task(&mut self, id: TaskId) -> PlannerResult<TaskRef> {
        let task = self.get_task(id).ok_or(PlannerError::NotFound(id))?;
        task.write().mark_completed();
        Ok(task)
    }

    pub fn reopen_task(&mut self, id: TaskId) -> PlannerResult<TaskRef> {
        let task = self.get_task(id).ok_or(PlannerError::NotFound(id))?;
        task.write().mark_incomplete();
        Ok(task)
    }

    /// Marks the task completed. A daily or weekly task also gets its next
    /// instance added to the registry, which is returned.
    pub fn complete_and_roll(&mut self, id: TaskId) -> PlannerResult<Option<TaskRef>> {
        let task = self.complete_task(id)?;
        let next = {
            let task = task.read();
            if !task.is_recurring() {
                return Ok(None);
            }
            task.next_occurrence()
        };
        debug!(
            task_id = %id,
            next_id = %next.id(),
            recurrence = %next.recurrence(),
            "recurring task rolled"
        );
        let next = next.into_ref();
        self.insert(next.clone());
        Ok(Some(next))
    }

    pub fn total_duration(&mut self, include_completed: bool) -> i64 {
        if !include_completed {
            return self
                .tasks
                .values()
                .map(|t| t.read())
                .filter(|t| !t.is_completed())
                .map(|t| t.duration_minutes())
                .sum();
        }
        if let Some(total) = self.duration_cache {
            return total;
        }
        let total: i64 = self.tasks.values().map(|t| t.read().duration_minutes()).sum();
        self.duration_cache = Some(total);
        total
    }

    pub fn pending_duration(&mut self) -> i64 {
        self.total_duration(false)
    }
}
