use super::{PersistenceError, PersistenceResult};
use crate::calendar::WorkCalendarConfig;
use crate::due_date::DueDate;
use crate::task::{DEFAULT_CATEGORY, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Everything needed to restore a worklist: its tasks and its calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorklistSnapshot {
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
    pub tasks: Vec<Task>,
}

impl WorklistSnapshot {
    pub fn new(calendar: WorkCalendarConfig, tasks: Vec<Task>) -> Self {
        Self { calendar, tasks }
    }
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &WorklistSnapshot,
    path: P,
) -> PersistenceResult<()> {
    super::validate_tasks(&snapshot.tasks)?;
    let path = path.as_ref();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    tracing::info!(
        path = %path.display(),
        tasks = snapshot.tasks.len(),
        days_off = snapshot.calendar.days_off().len(),
        "saved snapshot"
    );
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<WorklistSnapshot> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let snapshot: WorklistSnapshot = serde_json::from_reader(file)?;
    super::validate_tasks(&snapshot.tasks)?;
    tracing::info!(
        path = %path.display(),
        tasks = snapshot.tasks.len(),
        days_off = snapshot.calendar.days_off().len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

#[derive(Serialize, Deserialize)]
struct TaskCsvRecord {
    id: u32,
    name: String,
    category: String,
    finished: String,
    time_needed: u32,
    time_used: String,
    earliest_start: String,
    due: String,
    notes: String,
    date_added: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            category: task.category.clone(),
            finished: task.finished.to_string(),
            time_needed: task.time_needed,
            time_used: task.time_used.to_string(),
            earliest_start: format_date(Some(task.earliest_start)),
            due: task.due.to_string(),
            notes: task.notes.clone(),
            date_added: format_date(task.date_added),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task> {
        let earliest_start = parse_date(&self.earliest_start)?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("task {} has no earliest_start", self.id))
        })?;
        let due: DueDate = self
            .due
            .parse()
            .map_err(|err| PersistenceError::InvalidData(format!("task {}: {err}", self.id)))?;

        let category = if self.category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            self.category
        };

        let mut task = Task::new(self.id, self.name, self.time_needed, earliest_start, due)
            .with_category(category)
            .with_time_used(parse_u32(&self.time_used)?.unwrap_or(0))
            .with_notes(self.notes);
        task.finished = parse_bool(&self.finished)?.unwrap_or(false);
        task.date_added = parse_date(&self.date_added)?;
        Ok(task)
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> PersistenceResult<()> {
    super::validate_tasks(tasks)?;
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), tasks = tasks.len(), "saved tasks to csv");
    Ok(())
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    super::validate_tasks(&tasks)?;
    tracing::info!(path = %path.display(), tasks = tasks.len(), "loaded tasks from csv");
    Ok(tasks)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_u32(input: &str) -> PersistenceResult<Option<u32>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<u32>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
