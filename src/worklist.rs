use crate::calendar::{CalendarError, WorkDayCalendar};
use crate::capacity::DailyCapacityPolicy;
use crate::config::{ConfigError, WorklistConfig};
use crate::forecast::{Forecast, ForecastError, WorkloadForecast};
use crate::heatmap::HeatmapGrid;
use crate::holidays::{self, HolidayFeedError};
use crate::persistence::{self, PersistenceResult, TaskSource, WorklistSnapshot};
use crate::task::{Task, TaskId};
use crate::task_validation::{self, TaskValidationError};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorklistError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Holidays(#[from] HolidayFeedError),
}

/// Tasks, the work calendar and the settings the forecast runs with.
#[derive(Debug, Clone)]
pub struct Worklist {
    tasks: BTreeMap<TaskId, Task>,
    calendar: WorkDayCalendar,
    config: WorklistConfig,
    capacity: DailyCapacityPolicy,
}

impl Default for Worklist {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            calendar: WorkDayCalendar::default(),
            config: WorklistConfig::default(),
            capacity: DailyCapacityPolicy::default(),
        }
    }
}

impl Worklist {
    pub fn new(config: WorklistConfig) -> Result<Self, WorklistError> {
        config.forecast.weeks()?;
        let calendar = config.calendar.calendar()?;
        let capacity = config.capacity.policy()?;
        Ok(Self {
            tasks: BTreeMap::new(),
            calendar,
            config,
            capacity,
        })
    }

    /// Restore tasks and calendar from a snapshot; the snapshot's calendar replaces the configured one.
    pub fn from_snapshot(
        config: WorklistConfig,
        snapshot: WorklistSnapshot,
    ) -> Result<Self, WorklistError> {
        let mut worklist = Self::new(config)?;
        worklist.calendar = WorkDayCalendar::from_config(&snapshot.calendar)?;
        worklist.replace_tasks(snapshot.tasks)?;
        Ok(worklist)
    }

    pub fn snapshot(&self) -> WorklistSnapshot {
        WorklistSnapshot::new(self.calendar.to_config(), self.tasks().cloned().collect())
    }

    pub fn config(&self) -> &WorklistConfig {
        &self.config
    }

    pub fn capacity(&self) -> &DailyCapacityPolicy {
        &self.capacity
    }

    pub fn calendar(&self) -> &WorkDayCalendar {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut WorkDayCalendar {
        &mut self.calendar
    }

    /// Replace the whole task set, validating it as a collection first.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) -> Result<(), WorklistError> {
        task_validation::validate_task_collection(&tasks)?;
        self.tasks = tasks.into_iter().map(|task| (task.id, task)).collect();
        Ok(())
    }

    /// Insert or overwrite by id. Returns the previous task, if any.
    pub fn upsert_task(&mut self, task: Task) -> Result<Option<Task>, WorklistError> {
        task_validation::validate_task(&task)?;
        tracing::debug!(task_id = task.id, "upserting task");
        Ok(self.tasks.insert(task.id, task))
    }

    pub fn insert_task(&mut self, task: Task) -> Result<(), WorklistError> {
        if self.tasks.contains_key(&task.id) {
            return Err(TaskValidationError::DuplicateId(task.id).into());
        }
        self.upsert_task(task)?;
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, WorklistError> {
        self.tasks.remove(&id).ok_or(WorklistError::TaskNotFound(id))
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// All tasks in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Unfinished tasks sorted by due date: ASAP first, undated last.
    pub fn open_tasks(&self) -> Vec<Task> {
        persistence::open_sorted(self.tasks.values().cloned())
    }

    pub fn next_id(&self) -> TaskId {
        self.tasks
            .keys()
            .next_back()
            .map_or(1, |id| id.saturating_add(1))
    }

    pub fn complete_task(&mut self, id: TaskId) -> Result<(), WorklistError> {
        self.task_mut(id)?.finished = true;
        tracing::info!(task_id = id, "task completed");
        Ok(())
    }

    pub fn log_time(&mut self, id: TaskId, minutes: u32) -> Result<u32, WorklistError> {
        let task = self.task_mut(id)?;
        task.log_time(minutes);
        Ok(task.remaining_minutes())
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, WorklistError> {
        self.tasks
            .get_mut(&id)
            .ok_or(WorklistError::TaskNotFound(id))
    }

    /// Returns whether `date` became a vacation day.
    pub fn mark_vacation(&mut self, date: NaiveDate) -> bool {
        let marked = self.calendar.mark_vacation(date);
        tracing::info!(%date, marked, "vacation marked");
        marked
    }

    /// Returns whether a vacation mark was removed.
    pub fn unmark_vacation(&mut self, date: NaiveDate) -> bool {
        let removed = self.calendar.unmark_vacation(date);
        tracing::info!(%date, removed, "vacation unmarked");
        removed
    }

    pub fn import_holidays(&mut self, json: &str, province: &str) -> Result<usize, WorklistError> {
        Ok(holidays::import_holiday_feed(
            &mut self.calendar,
            json,
            province,
        )?)
    }

    pub fn forecast(&self, today: NaiveDate, now: NaiveTime) -> Result<Forecast, WorklistError> {
        let tasks = self.open_tasks();
        let forecast = WorkloadForecast::new(&self.calendar, &self.capacity)
            .with_asap_policy(self.config.forecast.asap)
            .execute(&tasks, today, now)?;
        tracing::debug!(
            tasks = tasks.len(),
            days = forecast.len(),
            total_minutes = forecast.total_minutes(),
            "forecast computed"
        );
        Ok(forecast)
    }

    /// Heatmap over the configured number of weeks, ignoring tasks that start after the last row.
    pub fn heatmap(&self, today: NaiveDate, now: NaiveTime) -> Result<HeatmapGrid, WorklistError> {
        let weeks = self.config.forecast.weeks()?;
        let tasks = self.open_tasks();
        let forecast = WorkloadForecast::new(&self.calendar, &self.capacity)
            .with_asap_policy(self.config.forecast.asap)
            .with_horizon_weeks(today, weeks)?
            .execute(&tasks, today, now)?;
        tracing::debug!(
            tasks = tasks.len(),
            weeks,
            total_minutes = forecast.total_minutes(),
            "heatmap forecast computed"
        );
        Ok(HeatmapGrid::build(
            &forecast,
            today,
            now,
            weeks,
            &self.capacity,
        )?)
    }

    /// Planned minutes for `date`.
    pub fn load_on(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        now: NaiveTime,
    ) -> Result<f64, WorklistError> {
        Ok(self.forecast(today, now)?.minutes_on(date))
    }
}

impl TaskSource for Worklist {
    fn open_tasks(&self) -> PersistenceResult<Vec<Task>> {
        Ok(Worklist::open_tasks(self))
    }
}
