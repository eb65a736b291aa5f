use crate::calendar::CalendarError;
use crate::task::Task;
use crate::task_validation::{self, TaskValidationError};
use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("store lock poisoned")]
    Poisoned,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Supplies the tasks a forecast is computed from.
pub trait TaskSource {
    /// Unfinished tasks, sorted by due date.
    fn open_tasks(&self) -> PersistenceResult<Vec<Task>>;
}

pub trait VacationStore {
    fn mark_vacation(&self, date: NaiveDate) -> PersistenceResult<()>;
    fn unmark_vacation(&self, date: NaiveDate) -> PersistenceResult<()>;
    fn vacation_days(&self) -> PersistenceResult<Vec<NaiveDate>>;
}

pub fn validate_tasks(tasks: &[Task]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)?;
    Ok(())
}

/// Keep unfinished tasks and order them by due date (ASAP first, undated last).
pub(crate) fn open_sorted(tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
    let mut open: Vec<Task> = tasks.into_iter().filter(Task::is_open).collect();
    open.sort_by_key(|task| (task.due, task.id));
    open
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    WorklistSnapshot, load_snapshot_from_json, load_tasks_from_csv, save_snapshot_to_json,
    save_tasks_to_csv,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWorklistStore;
