use super::{PersistenceError, PersistenceResult, TaskSource, VacationStore};
use crate::calendar::{DayOff, DayOffReason, WorkCalendarConfig, WorkDayCalendar};
use crate::task::{Task, TaskId};
use chrono::{NaiveDate, Weekday};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(Box::new(value))
    }
}

/// Tasks as JSON rows plus a `days_off(day, reason)` table.
pub struct SqliteWorklistStore {
    connection: Mutex<Connection>,
}

impl SqliteWorklistStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                task_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS days_off (
                day TEXT PRIMARY KEY,
                reason TEXT NOT NULL CHECK (reason IN ('vacation', 'holiday'))
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::Poisoned)
    }

    /// Replace every stored task with `tasks`.
    pub fn save_tasks(&self, tasks: &[Task]) -> PersistenceResult<()> {
        super::validate_tasks(tasks)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO tasks (id, task_json) VALUES (?1, ?2)")?;
            for task in tasks {
                stmt.execute(params![task.id, serde_json::to_string(task)?])?;
            }
        }
        tx.commit()?;
        tracing::info!(tasks = tasks.len(), "saved tasks to sqlite");
        Ok(())
    }

    pub fn upsert_task(&self, task: &Task) -> PersistenceResult<()> {
        crate::task_validation::validate_task(task)?;
        let json = serde_json::to_string(task)?;
        self.lock()?.execute(
            "INSERT INTO tasks (id, task_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET task_json = excluded.task_json",
            params![task.id, json],
        )?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete_task(&self, id: TaskId) -> PersistenceResult<bool> {
        let removed = self
            .lock()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    pub fn find_task(&self, id: TaskId) -> PersistenceResult<Option<Task>> {
        let conn = self.lock()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT task_json FROM tasks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|json| serde_json::from_str(&json).map_err(PersistenceError::from))
            .transpose()
    }

    pub fn load_tasks(&self) -> PersistenceResult<Vec<Task>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT task_json FROM tasks ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tasks: Vec<Task> = Vec::new();
        for json in rows {
            tasks.push(serde_json::from_str(&json?)?);
        }
        super::validate_tasks(&tasks)?;
        tracing::info!(tasks = tasks.len(), "loaded tasks from sqlite");
        Ok(tasks)
    }

    pub fn add_holiday(&self, date: NaiveDate) -> PersistenceResult<()> {
        self.lock()?.execute(
            "INSERT INTO days_off (day, reason) VALUES (?1, 'holiday')
             ON CONFLICT(day) DO UPDATE SET reason = 'holiday'",
            params![format_day(date)],
        )?;
        Ok(())
    }

    pub fn load_days_off(&self) -> PersistenceResult<Vec<DayOff>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT day, reason FROM days_off ORDER BY day ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut days_off = Vec::new();
        for row in rows {
            let (day, reason) = row?;
            days_off.push(DayOff {
                date: parse_day(&day)?,
                reason: parse_reason(&reason)?,
            });
        }
        Ok(days_off)
    }

    /// Rebuild the work calendar from the stored days off.
    pub fn calendar<I>(&self, working_days: I) -> PersistenceResult<WorkDayCalendar>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let days_off = self.load_days_off()?;
        tracing::info!(days_off = days_off.len(), "loaded calendar from sqlite");
        let config = WorkCalendarConfig::new(working_days, days_off)?;
        Ok(WorkDayCalendar::from_config(&config)?)
    }
}

impl TaskSource for SqliteWorklistStore {
    fn open_tasks(&self) -> PersistenceResult<Vec<Task>> {
        Ok(super::open_sorted(self.load_tasks()?))
    }
}

impl VacationStore for SqliteWorklistStore {
    /// Holidays already stored on `date` keep their reason.
    fn mark_vacation(&self, date: NaiveDate) -> PersistenceResult<()> {
        let inserted = self.lock()?.execute(
            "INSERT OR IGNORE INTO days_off (day, reason) VALUES (?1, 'vacation')",
            params![format_day(date)],
        )?;
        tracing::info!(%date, marked = inserted > 0, "vacation marked");
        Ok(())
    }

    fn unmark_vacation(&self, date: NaiveDate) -> PersistenceResult<()> {
        let removed = self.lock()?.execute(
            "DELETE FROM days_off WHERE day = ?1 AND reason = 'vacation'",
            params![format_day(date)],
        )?;
        tracing::info!(%date, removed = removed > 0, "vacation unmarked");
        Ok(())
    }

    fn vacation_days(&self) -> PersistenceResult<Vec<NaiveDate>> {
        Ok(self
            .load_days_off()?
            .into_iter()
            .filter(|day| day.reason == DayOffReason::Vacation)
            .map(|day| day.date)
            .collect())
    }
}

fn format_day(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_day(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid day '{input}': {e}")))
}

fn parse_reason(input: &str) -> PersistenceResult<DayOffReason> {
    match input {
        "vacation" => Ok(DayOffReason::Vacation),
        "holiday" => Ok(DayOffReason::Holiday),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid day-off reason '{other}'"
        ))),
    }
}
