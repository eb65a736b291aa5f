use crate::due_date::DueDate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type TaskId = u32;

pub const DEFAULT_CATEGORY: &str = "Work";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// One unit of tracked work.
///
/// Times are whole minutes. `time_used` may exceed `time_needed` when a task runs over its
/// estimate; [`Task::remaining_minutes`] then reports zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub finished: bool,
    pub time_needed: u32,
    #[serde(default)]
    pub time_used: u32,
    /// No work is planned before this date.
    pub earliest_start: NaiveDate,
    pub due: DueDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDate>,
}

impl Task {
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        time_needed: u32,
        earliest_start: NaiveDate,
        due: impl Into<DueDate>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: default_category(),
            finished: false,
            time_needed,
            time_used: 0,
            earliest_start,
            due: due.into(),
            notes: String::new(),
            date_added: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_time_used(mut self, minutes: u32) -> Self {
        self.time_used = minutes;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_date_added(mut self, date: NaiveDate) -> Self {
        self.date_added = Some(date);
        self
    }

    pub fn finished(mut self) -> Self {
        self.finished = true;
        self
    }

    /// Minutes still to be spent, floored at zero.
    pub fn remaining_minutes(&self) -> u32 {
        self.time_needed.saturating_sub(self.time_used)
    }

    pub fn is_open(&self) -> bool {
        !self.finished
    }

    pub fn log_time(&mut self, minutes: u32) {
        self.time_used = self.time_used.saturating_add(minutes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn remaining_minutes_floors_at_zero() {
        let task = Task::new(1, "Report", 60, d(2025, 1, 6), d(2025, 1, 10)).with_time_used(90);
        assert_eq!(task.remaining_minutes(), 0);

        let task = Task::new(2, "Slides", 60, d(2025, 1, 6), d(2025, 1, 10)).with_time_used(15);
        assert_eq!(task.remaining_minutes(), 45);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{
            "id": 7,
            "name": "Review",
            "time_needed": 30,
            "earliest_start": "2025-01-06",
            "due": "ASAP"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert_eq!(task.time_used, 0);
        assert!(task.is_open());
        assert_eq!(task.due, DueDate::Asap);
    }
}
