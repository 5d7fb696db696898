use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId, TaskRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Both tasks belong to the same pet.
    SamePet,
    /// Tasks belong to different pets, or at least one has no pet.
    DifferentPets,
}

impl ConflictKind {
    pub fn classify(a: &Task, b: &Task) -> Self {
        match (a.pet_id(), b.pet_id()) {
            (Some(x), Some(y)) if x == y => ConflictKind::SamePet,
            _ => ConflictKind::DifferentPets,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConflictKind::SamePet => "same pet double-booked",
            ConflictKind::DifferentPets => "different-pet overlap (owner must juggle)",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Two tasks whose `[start, start + duration)` intervals overlap.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub first: TaskRef,
    pub second: TaskRef,
    pub kind: ConflictKind,
    pub reason: String,
}

impl Conflict {
    /// Returns `None` when the tasks do not overlap or are the same task.
    pub(crate) fn detect(first: &TaskRef, second: &TaskRef) -> Option<Self> {
        if Arc::ptr_eq(first, second) {
            return None;
        }
        let (kind, reason) = {
            let a = first.read();
            let b = second.read();
            if !a.overlaps(&b) {
                return None;
            }
            let kind = ConflictKind::classify(&a, &b);
            let reason = format!(
                "{}: '{}' ({}) overlaps '{}' ({})",
                capitalize(kind.label()),
                a.name(),
                span(&a),
                b.name(),
                span(&b)
            );
            (kind, reason)
        };
        Some(Self {
            first: first.clone(),
            second: second.clone(),
            kind,
            reason,
        })
    }

    pub fn task_ids(&self) -> (TaskId, TaskId) {
        (self.first.read().id(), self.second.read().id())
    }

    pub fn involves(&self, id: TaskId) -> bool {
        let (a, b) = self.task_ids();
        a == id || b == id
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

fn span(task: &Task) -> String {
    match task.end_time() {
        Some(end) => format!("{}-{}", task.time(), end.format("%H:%M")),
        None => format!("{}+{}min", task.time(), task.duration_minutes()),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
