use crate::task::TaskId;

/// Failures surfaced by the registry, planner and export surfaces.
///
/// None of these are fatal; each one is recoverable by the caller fixing the
/// input or finishing setup.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// A field failed validation on construction or mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A task with the same name and time already exists.
    #[error("duplicate task '{name}' at {time}")]
    DuplicateTask { name: String, time: String },

    /// An operation was invoked before its setup step.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// No task is stored under the given id.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// Writing an exported plan failed.
    #[error("export error: {0}")]
    Export(String),
}

impl PlannerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<csv::Error> for PlannerError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Export(value.to_string())
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(value: std::io::Error) -> Self {
        Self::Export(value.to_string())
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
