#![cfg(feature = "sqlite")]

use chrono::{NaiveDate, Weekday};
use tempfile::NamedTempFile;
use worklist::calendar::CalendarError;
use worklist::persistence::{PersistenceError, SqliteWorklistStore, TaskSource, VacationStore};
use worklist::{DayOffReason, DueDate, Task};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

#[test]
fn sqlite_store_round_trip_tasks() {
    let file = NamedTempFile::new().unwrap();
    let tasks = vec![
        Task::new(2, "Build", 600, d(7), d(17)).with_time_used(30),
        Task::new(1, "Design", 240, d(6), d(8)).with_category("Planning"),
    ];

    {
        let store = SqliteWorklistStore::new(file.path()).unwrap();
        store.save_tasks(&tasks).unwrap();
    }

    let store = SqliteWorklistStore::new(file.path()).unwrap();
    let loaded = store.load_tasks().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], tasks[1]);
    assert_eq!(loaded[1], tasks[0]);
}

#[test]
fn upsert_find_and_delete() {
    let store = SqliteWorklistStore::in_memory().unwrap();
    let mut task = Task::new(5, "Draft", 90, d(6), d(9));
    store.upsert_task(&task).unwrap();

    task.log_time(45);
    store.upsert_task(&task).unwrap();
    assert_eq!(store.find_task(5).unwrap().unwrap().time_used, 45);

    assert!(store.delete_task(5).unwrap());
    assert!(!store.delete_task(5).unwrap());
    assert!(store.find_task(5).unwrap().is_none());
}

#[test]
fn open_tasks_are_unfinished_and_due_sorted() {
    let store = SqliteWorklistStore::in_memory().unwrap();
    store
        .save_tasks(&[
            Task::new(1, "Someday", 60, d(6), DueDate::None),
            Task::new(2, "Friday", 60, d(6), d(10)),
            Task::new(3, "Done", 60, d(6), d(7)).finished(),
            Task::new(4, "Now", 60, d(6), DueDate::Asap),
            Task::new(5, "Tuesday", 60, d(6), d(7)),
        ])
        .unwrap();

    let ids: Vec<u32> = store.open_tasks().unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![4, 5, 2, 1]);
}

#[test]
fn vacation_store_marks_and_unmarks() {
    let store = SqliteWorklistStore::in_memory().unwrap();
    store.mark_vacation(d(8)).unwrap();
    store.mark_vacation(d(8)).unwrap();
    store.mark_vacation(d(9)).unwrap();
    assert_eq!(store.vacation_days().unwrap(), vec![d(8), d(9)]);

    store.unmark_vacation(d(8)).unwrap();
    assert_eq!(store.vacation_days().unwrap(), vec![d(9)]);
}

#[test]
fn holidays_survive_vacation_changes() {
    let store = SqliteWorklistStore::in_memory().unwrap();
    store.add_holiday(d(1)).unwrap();
    store.mark_vacation(d(1)).unwrap();
    store.unmark_vacation(d(1)).unwrap();

    let days_off = store.load_days_off().unwrap();
    assert_eq!(days_off.len(), 1);
    assert_eq!(days_off[0].reason, DayOffReason::Holiday);
    assert!(store.vacation_days().unwrap().is_empty());
}

#[test]
fn duplicate_ids_are_rejected() {
    let store = SqliteWorklistStore::in_memory().unwrap();
    let result = store.save_tasks(&[
        Task::new(1, "A", 10, d(6), d(7)),
        Task::new(1, "B", 10, d(6), d(7)),
    ]);
    assert!(result.is_err());
    assert!(store.load_tasks().unwrap().is_empty());
}

#[test]
fn stored_days_off_rebuild_the_calendar() {
    let store = SqliteWorklistStore::in_memory().unwrap();
    store.add_holiday(d(1)).unwrap();
    store.mark_vacation(d(8)).unwrap();

    let working_week = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];
    let calendar = store.calendar(working_week).unwrap();
    assert_eq!(calendar.holidays(), vec![d(1)]);
    assert_eq!(calendar.vacations(), vec![d(8)]);
    assert_eq!(calendar.work_days_between(d(6), d(10)), 4);

    assert!(matches!(
        store.calendar(Vec::new()),
        Err(PersistenceError::Calendar(CalendarError::NoWorkingDays))
    ));
}
