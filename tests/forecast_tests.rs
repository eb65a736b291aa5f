use chrono::{NaiveDate, NaiveTime};
use worklist::{
    AsapPolicy, DailyCapacityPolicy, DueDate, ForecastError, Task, WorkDayCalendar,
    WorkloadForecast, forecast,
};

const EPSILON: f64 = 1e-9;

// January 2025: the 6th is a Monday.
fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn even_split_over_working_week() {
    let tasks = vec![Task::new(1, "Report", 480, d(6), d(10))];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(9, 0),
    )
    .unwrap();

    for day in 6..=10 {
        assert_close(result.minutes_on(d(day)), 96.0);
    }
    assert_close(result.total_minutes(), 480.0);
}

#[test]
fn capped_days_overflow_onto_due_date() {
    let tasks = vec![Task::new(1, "Migration", 2000, d(6), d(10))];
    // Sunday: every day in the window gets the flat future cap.
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(5),
        t(9, 0),
    )
    .unwrap();

    for day in 6..=9 {
        assert_close(result.minutes_on(d(day)), 360.0);
    }
    assert_close(result.minutes_on(d(10)), 560.0);
    assert_close(result.total_minutes(), 2000.0);
}

#[test]
fn start_equal_to_due_lands_entirely_on_that_day() {
    let tasks = vec![Task::new(1, "Hotfix", 900, d(6), d(6))];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(15, 0),
    )
    .unwrap();

    assert_eq!(result.len(), 1);
    assert_close(result.minutes_on(d(6)), 900.0);
}

#[test]
fn earlier_due_date_claims_shared_capacity_first() {
    let a = Task::new(1, "A", 600, d(6), d(7));
    let b = Task::new(2, "B", 600, d(6), d(8));
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();

    // Input order must not matter.
    let both = forecast(&[b.clone(), a.clone()], &calendar, &capacity, d(5), t(9, 0)).unwrap();
    let alone = forecast(&[a], &calendar, &capacity, d(5), t(9, 0)).unwrap();

    assert_close(alone.minutes_on(d(6)), 300.0);
    assert_close(alone.minutes_on(d(7)), 300.0);

    assert_close(both.minutes_on(d(6)), 360.0);
    assert_close(both.minutes_on(d(7)), 360.0);
    assert_close(both.minutes_on(d(8)), 480.0);
    assert_close(both.total_minutes(), 1200.0);
}

#[test]
fn later_tasks_never_reduce_earlier_allocations() {
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();
    let urgent = Task::new(1, "Urgent", 500, d(6), d(8));
    let later = vec![
        urgent.clone(),
        Task::new(2, "Later", 3000, d(6), d(17)),
        Task::new(3, "Much later", 1200, d(7), d(24)),
    ];

    let alone = forecast(&[urgent], &calendar, &capacity, d(6), t(8, 0)).unwrap();
    let crowded = forecast(&later, &calendar, &capacity, d(6), t(8, 0)).unwrap();

    for (day, minutes) in alone.iter() {
        assert!(crowded.minutes_on(day) + EPSILON >= minutes);
    }
}

#[test]
fn todays_capacity_follows_the_clock() {
    let tasks = vec![Task::new(1, "Review", 1000, d(6), d(10))];
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();

    let afternoon = forecast(&tasks, &calendar, &capacity, d(6), t(14, 0)).unwrap();
    assert_close(afternoon.minutes_on(d(6)), 120.0);

    let evening = forecast(&tasks, &calendar, &capacity, d(6), t(17, 30)).unwrap();
    assert_close(evening.minutes_on(d(6)), 0.0);
    assert_close(evening.minutes_on(d(7)), 250.0);
    assert_close(evening.total_minutes(), 1000.0);
}

#[test]
fn weekends_receive_nothing_in_the_middle_of_a_window() {
    // Friday to Tuesday: three working days.
    let tasks = vec![Task::new(1, "Spanning", 300, d(10), d(14))];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(9, 0),
    )
    .unwrap();

    assert_close(result.minutes_on(d(10)), 100.0);
    assert_close(result.minutes_on(d(13)), 100.0);
    assert_close(result.minutes_on(d(14)), 100.0);
    assert!(!result.as_map().contains_key(&d(11)));
    assert!(!result.as_map().contains_key(&d(12)));
}

#[test]
fn window_without_working_days_dumps_on_due_date() {
    let tasks = vec![Task::new(1, "Weekend chore", 240, d(11), d(12))];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(9, 0),
    )
    .unwrap();

    assert_eq!(result.len(), 1);
    assert_close(result.minutes_on(d(12)), 240.0);
}

#[test]
fn vacation_days_are_skipped() {
    let calendar = WorkDayCalendar::with_vacations([d(8)]);
    let tasks = vec![Task::new(1, "Essay", 400, d(6), d(10))];
    let result = forecast(
        &tasks,
        &calendar,
        &DailyCapacityPolicy::default(),
        d(5),
        t(9, 0),
    )
    .unwrap();

    for day in [6, 7, 9, 10] {
        assert_close(result.minutes_on(d(day)), 100.0);
    }
    assert!(!result.as_map().contains_key(&d(8)));
}

#[test]
fn overdue_and_inverted_windows_contribute_nothing() {
    let tasks = vec![
        Task::new(1, "Overdue", 120, d(1), d(3)),
        Task::new(2, "Inverted", 120, d(9), d(7)),
    ];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(9, 0),
    )
    .unwrap();
    assert!(result.is_empty());
}

#[test]
fn time_already_used_reduces_the_load() {
    let tasks = vec![Task::new(1, "Half done", 200, d(6), d(7)).with_time_used(120)];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(9, 0),
    )
    .unwrap();
    assert_close(result.total_minutes(), 80.0);
}

#[test]
fn undated_tasks_are_skipped() {
    let tasks = vec![Task::new(1, "Someday", 600, d(6), DueDate::None)];
    let result = forecast(
        &tasks,
        &WorkDayCalendar::default(),
        &DailyCapacityPolicy::default(),
        d(6),
        t(9, 0),
    )
    .unwrap();
    assert!(result.is_empty());
}

#[test]
fn asap_policy_controls_asap_tasks() {
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();
    let tasks = vec![
        Task::new(1, "Call back", 45, d(6), DueDate::Asap),
        Task::new(2, "Later", 300, d(8), DueDate::Asap),
    ];

    let excluded = WorkloadForecast::new(&calendar, &capacity)
        .execute(&tasks, d(6), t(9, 0))
        .unwrap();
    assert!(excluded.is_empty());

    let immediate = WorkloadForecast::new(&calendar, &capacity)
        .with_asap_policy(AsapPolicy::DueImmediately)
        .execute(&tasks, d(6), t(9, 0))
        .unwrap();
    assert_close(immediate.minutes_on(d(6)), 45.0);
    assert_close(immediate.minutes_on(d(8)), 300.0);
}

#[test]
fn horizon_drops_tasks_starting_after_it() {
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();
    let tasks = vec![
        Task::new(1, "This week", 100, d(6), d(7)),
        Task::new(2, "Next month", 100, d(31), NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()),
    ];

    let result = WorkloadForecast::new(&calendar, &capacity)
        .with_horizon_end(d(17))
        .execute(&tasks, d(6), t(9, 0))
        .unwrap();
    assert_close(result.total_minutes(), 100.0);
}

#[test]
fn repeated_runs_are_identical() {
    let calendar = WorkDayCalendar::with_vacations([d(9)]);
    let capacity = DailyCapacityPolicy::default();
    let tasks = vec![
        Task::new(1, "A", 700, d(6), d(10)),
        Task::new(2, "B", 1300, d(7), d(15)),
        Task::new(3, "C", 90, d(6), d(6)),
    ];

    let first = forecast(&tasks, &calendar, &capacity, d(6), t(10, 15)).unwrap();
    let second = forecast(&tasks, &calendar, &capacity, d(6), t(10, 15)).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn total_load_is_conserved_across_many_tasks() {
    let calendar = WorkDayCalendar::with_vacations([d(8), d(20)]);
    let capacity = DailyCapacityPolicy::default();
    let tasks = vec![
        Task::new(1, "A", 2400, d(6), d(10)),
        Task::new(2, "B", 900, d(6), d(8)),
        Task::new(3, "C", 60, d(13), d(13)),
        Task::new(4, "D", 1800, d(9), d(24)),
    ];

    let result = forecast(&tasks, &calendar, &capacity, d(6), t(11, 0)).unwrap();
    assert!((result.total_minutes() - 5160.0).abs() < 1e-6);
    assert!(result.iter().all(|(_, minutes)| minutes >= 0.0));
}

#[test]
fn week_horizon_keeps_tasks_starting_in_the_displayed_weeks() {
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();
    let tasks = vec![
        Task::new(1, "This week", 120, d(10), d(10)),
        Task::new(2, "Next week", 120, d(13), d(13)),
    ];

    // Wednesday: one week of rows ends on Sunday the 12th.
    let result = WorkloadForecast::new(&calendar, &capacity)
        .with_horizon_weeks(d(8), 1)
        .unwrap()
        .execute(&tasks, d(8), t(9, 0))
        .unwrap();
    assert_close(result.minutes_on(d(10)), 120.0);
    assert_close(result.minutes_on(d(13)), 0.0);
}

#[test]
fn horizon_beyond_the_calendar_is_out_of_range() {
    let calendar = WorkDayCalendar::default();
    let capacity = DailyCapacityPolicy::default();
    let err = WorkloadForecast::new(&calendar, &capacity)
        .with_horizon_weeks(NaiveDate::MAX, 2)
        .err();
    assert!(matches!(err, Some(ForecastError::DateOutOfRange { .. })));

    assert!(matches!(
        worklist::forecast::step_days(NaiveDate::MIN, -1),
        Err(ForecastError::DateOutOfRange { days: -1, .. })
    ));
    assert_eq!(worklist::forecast::week_start(d(12)), Ok(d(6)));
}
