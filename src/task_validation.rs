use crate::task::{Task, TaskId};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("duplicate task id {0}")]
    DuplicateId(TaskId),
    #[error("task {0} requires a non-empty name")]
    BlankName(TaskId),
    #[error("task {0} requires a non-empty category")]
    BlankCategory(TaskId),
}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.name.trim().is_empty() {
        return Err(TaskValidationError::BlankName(task.id));
    }
    if task.category.trim().is_empty() {
        return Err(TaskValidationError::BlankCategory(task.id));
    }
    Ok(())
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id) {
            return Err(TaskValidationError::DuplicateId(task.id));
        }
        validate_task(task)?;
    }
    Ok(())
}
