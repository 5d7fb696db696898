use std::io::Write;

use serde::Serialize;

use crate::error::PlannerResult;
use crate::explain::PlanSummary;
use crate::task::TaskRef;

#[derive(Serialize)]
struct PlanCsvRecord {
    position: usize,
    id: String,
    name: String,
    task_type: String,
    time: String,
    end_minutes: i64,
    duration_minutes: i64,
    priority: i32,
    pet_id: String,
    recurrence: String,
    completed: bool,
}

impl PlanCsvRecord {
    fn from_task(position: usize, task: &TaskRef) -> Self {
        let task = task.read();
        Self {
            position,
            id: task.id().to_string(),
            name: task.name().to_string(),
            task_type: task.task_type().to_string(),
            time: task.time().to_string(),
            end_minutes: task.end_minutes(),
            duration_minutes: task.duration_minutes(),
            priority: task.priority(),
            pet_id: task.pet_id().unwrap_or_default().to_string(),
            recurrence: task.recurrence().to_string(),
            completed: task.is_completed(),
        }
    }
}

/// One CSV row per planned task, in plan order, positions starting at 1.
pub fn write_plan_csv<W: Write>(plan: &[TaskRef], writer: W) -> PlannerResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (idx, task) in plan.iter().enumerate() {
        wtr.serialize(PlanCsvRecord::from_task(idx + 1, task))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary_json<W: Write>(summary: &PlanSummary, writer: W) -> PlannerResult<()> {
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
