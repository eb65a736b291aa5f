//! Day-by-day workload forecast.
//!
//! Tasks are processed in due-date order. Each task spreads its remaining minutes evenly over the
//! working days left in its window, never pushing a day past its capacity; whatever could not be
//! placed lands on the due date regardless of capacity, so overcommitment stays visible.

use crate::calendar::{WorkDayCalendar, days_inclusive};
use crate::capacity::CapacityPolicy;
use crate::due_date::DueDate;
use crate::task::Task;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// How tasks due "as soon as possible" enter the forecast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsapPolicy {
    /// ASAP tasks have no distribution window and are left out.
    #[default]
    Exclude,
    /// ASAP tasks are due on the first day they can be worked on, so their whole load lands there.
    DueImmediately,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error("no working days left between {day} and due date {due}")]
    EmptyDivisor { day: NaiveDate, due: NaiveDate },
    #[error("moving {days} days from {from} leaves the supported date range")]
    DateOutOfRange { from: NaiveDate, days: i64 },
}

/// `from` moved by `days`, or [`ForecastError::DateOutOfRange`] past the calendar's ends.
pub fn step_days(from: NaiveDate, days: i64) -> Result<NaiveDate, ForecastError> {
    Duration::try_days(days)
        .and_then(|delta| from.checked_add_signed(delta))
        .ok_or(ForecastError::DateOutOfRange { from, days })
}

/// The Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> Result<NaiveDate, ForecastError> {
    step_days(date, -i64::from(date.weekday().num_days_from_monday()))
}

/// Planned minutes per calendar day. Dates that are absent carry no load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Forecast {
    minutes: BTreeMap<NaiveDate, f64>,
}

impl Forecast {
    pub fn minutes_on(&self, date: NaiveDate) -> f64 {
        self.minutes.get(&date).copied().unwrap_or(0.0)
    }

    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        self.minutes_on(date) / 60.0
    }

    pub fn total_minutes(&self) -> f64 {
        self.minutes.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.minutes.iter().map(|(date, minutes)| (*date, *minutes))
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.minutes
    }

    pub fn into_map(self) -> BTreeMap<NaiveDate, f64> {
        self.minutes
    }

    fn deposit(&mut self, date: NaiveDate, minutes: f64) {
        *self.minutes.entry(date).or_insert(0.0) += minutes;
    }
}

pub struct WorkloadForecast<'a, P> {
    calendar: &'a WorkDayCalendar,
    capacity: &'a P,
    asap: AsapPolicy,
    horizon_end: Option<NaiveDate>,
}

impl<'a, P: CapacityPolicy> WorkloadForecast<'a, P> {
    pub fn new(calendar: &'a WorkDayCalendar, capacity: &'a P) -> Self {
        Self {
            calendar,
            capacity,
            asap: AsapPolicy::default(),
            horizon_end: None,
        }
    }

    pub fn with_asap_policy(mut self, asap: AsapPolicy) -> Self {
        self.asap = asap;
        self
    }

    /// Skip tasks that cannot start on or before `horizon_end`.
    pub fn with_horizon_end(mut self, horizon_end: NaiveDate) -> Self {
        self.horizon_end = Some(horizon_end);
        self
    }

    /// Horizon ending on the Sunday `weeks` weeks after the Monday of `today`'s week.
    pub fn with_horizon_weeks(self, today: NaiveDate, weeks: u32) -> Result<Self, ForecastError> {
        let monday = week_start(today)?;
        let horizon_end = step_days(monday, i64::from(weeks) * 7 - 1)?;
        Ok(self.with_horizon_end(horizon_end))
    }

    pub fn execute(
        &self,
        tasks: &[Task],
        today: NaiveDate,
        now: NaiveTime,
    ) -> Result<Forecast, ForecastError> {
        let mut ordered: Vec<(NaiveDate, &Task)> = tasks
            .iter()
            .filter(|task| self.within_horizon(task))
            .filter_map(|task| self.resolve_due(task, today).map(|due| (due, task)))
            .collect();
        // Stable: equal due dates keep their input order, ASAP ahead of dated tasks.
        ordered.sort_by_key(|(due, task)| (*due, task.due));

        let mut forecast = Forecast::default();
        for (due, task) in ordered {
            self.distribute(task, due, today, now, &mut forecast)?;
        }
        Ok(forecast)
    }

    fn within_horizon(&self, task: &Task) -> bool {
        self.horizon_end
            .is_none_or(|horizon_end| task.earliest_start <= horizon_end)
    }

    fn resolve_due(&self, task: &Task, today: NaiveDate) -> Option<NaiveDate> {
        match task.due {
            DueDate::On(date) => Some(date),
            DueDate::None => None,
            DueDate::Asap => match self.asap {
                AsapPolicy::Exclude => None,
                AsapPolicy::DueImmediately => Some(today.max(task.earliest_start)),
            },
        }
    }

    fn distribute(
        &self,
        task: &Task,
        due: NaiveDate,
        today: NaiveDate,
        now: NaiveTime,
        forecast: &mut Forecast,
    ) -> Result<(), ForecastError> {
        let start = today.max(task.earliest_start);
        if start > due {
            return Ok(());
        }

        let mut remaining = f64::from(task.remaining_minutes());
        let mut work_days_left = self.calendar.work_days_between(start, due);

        for day in days_inclusive(start, due) {
            if day == due {
                break;
            }
            if !self.calendar.is_work_day(day) {
                continue;
            }
            if work_days_left == 0 {
                return Err(ForecastError::EmptyDivisor { day, due });
            }

            let share = remaining / f64::from(work_days_left);
            let headroom = (self.capacity.max_minutes_for(day, today, now)
                - forecast.minutes_on(day))
            .max(0.0);
            let deposit = share.min(headroom);

            forecast.deposit(day, deposit);
            remaining = (remaining - deposit).max(0.0);
            work_days_left -= 1;
        }

        // Overflow: whatever is left belongs to the due date, capacity or not.
        forecast.deposit(due, remaining);
        Ok(())
    }
}

/// Forecast with the default ASAP policy and no horizon.
pub fn forecast<P: CapacityPolicy>(
    tasks: &[Task],
    calendar: &WorkDayCalendar,
    capacity: &P,
    today: NaiveDate,
    now: NaiveTime,
) -> Result<Forecast, ForecastError> {
    WorkloadForecast::new(calendar, capacity).execute(tasks, today, now)
}
