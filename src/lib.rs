pub mod conflict;
pub mod error;
pub mod explain;
pub mod export;
pub mod pet;
pub mod planner;
pub mod registry;
pub mod task;
pub mod time;

pub use conflict::{Conflict, ConflictKind};
pub use error::{PlannerError, PlannerResult};
pub use explain::PlanSummary;
pub use export::{write_plan_csv, write_summary_json};
pub use pet::{Owner, Pet};
pub use planner::{DailyPlanner, Preferences};
pub use registry::{CreatedTask, NewTask, SharedRegistry, TaskRegistry};
pub use task::{Recurrence, Task, TaskId, TaskRef, TaskUpdate};
