use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Why a date that would otherwise be a working day is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOffReason {
    Vacation,
    Holiday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOff {
    pub date: NaiveDate,
    pub reason: DayOffReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("work calendar requires at least one working day")]
    NoWorkingDays,
}

/// Persisted through [`WorkCalendarConfig`], which keeps weekdays in a stable order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkDayCalendar {
    days_off: BTreeMap<NaiveDate, DayOffReason>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    #[serde(default)]
    days_off: Vec<DayOff>,
}

impl Default for WorkDayCalendar {
    fn default() -> Self {
        Self {
            days_off: BTreeMap::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkDayCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Mon-Fri calendar with the given dates marked as vacation.
    pub fn with_vacations<I>(vacations: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut calendar = Self::default();
        for date in vacations {
            calendar.mark_vacation(date);
        }
        calendar
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        let mut calendar = Self {
            days_off: BTreeMap::new(),
            non_working_days,
        };
        for day_off in &config.days_off {
            match day_off.reason {
                DayOffReason::Vacation => {
                    calendar.mark_vacation(day_off.date);
                }
                DayOffReason::Holiday => calendar.add_holiday(day_off.date),
            }
        }
        Ok(calendar)
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    /// Set custom working days (e.g., Mon-Sat for 6-day weeks)
    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    pub fn working_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !self.non_working_days.contains(day))
            .collect()
    }

    /// Mark a date as a vacation day. Holidays keep their reason.
    /// Returns `false` when `date` was already a day off.
    pub fn mark_vacation(&mut self, date: NaiveDate) -> bool {
        if self.days_off.contains_key(&date) {
            return false;
        }
        self.days_off.insert(date, DayOffReason::Vacation);
        true
    }

    /// Remove a vacation mark. Holidays are left untouched. Returns whether a mark was removed.
    pub fn unmark_vacation(&mut self, date: NaiveDate) -> bool {
        if self.days_off.get(&date) == Some(&DayOffReason::Vacation) {
            self.days_off.remove(&date);
            return true;
        }
        false
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.days_off.insert(date, DayOffReason::Holiday);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        for date in dates {
            self.add_holiday(*date);
        }
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) {
        if self.days_off.get(&date) == Some(&DayOffReason::Holiday) {
            self.days_off.remove(&date);
        }
    }

    pub fn day_off_reason(&self, date: NaiveDate) -> Option<DayOffReason> {
        self.days_off.get(&date).copied()
    }

    pub fn vacations(&self) -> Vec<NaiveDate> {
        self.days_off_with(DayOffReason::Vacation)
    }

    pub fn holidays(&self) -> Vec<NaiveDate> {
        self.days_off_with(DayOffReason::Holiday)
    }

    fn days_off_with(&self, reason: DayOffReason) -> Vec<NaiveDate> {
        self.days_off
            .iter()
            .filter(|(_, r)| **r == reason)
            .map(|(date, _)| *date)
            .collect()
    }

    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        !self.days_off.contains_key(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// Count working days in the inclusive range `[start, end]`.
    pub fn work_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let mut count = 0;
        for date in days_inclusive(start, end) {
            if self.is_work_day(date) {
                count += 1;
            }
        }
        count
    }

    /// All working days in the inclusive range `[start, end]`.
    pub fn work_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        days_inclusive(start, end)
            .filter(|date| self.is_work_day(*date))
            .collect()
    }

    /// The first working day on or after `from`.
    pub fn next_work_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        from.iter_days().find(|date| self.is_work_day(*date))
    }
}

/// Every calendar day from `start` to `end`, both included. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, days_off: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = DayOff>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut days_off: Vec<DayOff> = days_off.into_iter().collect();
        days_off.sort_by_key(|day| day.date);
        days_off.dedup_by_key(|day| day.date);

        Ok(Self {
            working_days: working,
            days_off,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn days_off(&self) -> &[DayOff] {
        &self.days_off
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkDayCalendar::default())
    }
}

impl From<&WorkDayCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkDayCalendar) -> Self {
        let days_off = calendar
            .days_off
            .iter()
            .map(|(date, reason)| DayOff {
                date: *date,
                reason: *reason,
            })
            .collect();

        Self {
            working_days: calendar.working_days(),
            days_off,
        }
    }
}
