use crate::capacity::DailyCapacityPolicy;
use crate::forecast::{Forecast, ForecastError, step_days, week_start};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt::Write as _;

const WEEKDAY_LABELS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];
const MIN_TODAY_SCALE_HOURS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub is_today: bool,
    /// `None` for days before today.
    pub hours: Option<f64>,
    pub color: Option<String>,
}

/// Weeks of Mon-Fri cells starting at the Monday of the current week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub weeks: Vec<[HeatmapCell; 5]>,
}

impl HeatmapGrid {
    pub fn build(
        forecast: &Forecast,
        today: NaiveDate,
        now: NaiveTime,
        weeks: u32,
        capacity: &DailyCapacityPolicy,
    ) -> Result<Self, ForecastError> {
        let monday = week_start(today)?;
        step_days(monday, i64::from(weeks) * 7 - 1)?;
        let full_day_hours = capacity.today_ceiling_minutes() / 60.0;
        let today_hours = (capacity.minutes_left_today(now) / 60.0).max(MIN_TODAY_SCALE_HOURS);

        let mut rows = Vec::new();
        for week in 0..weeks {
            let first_day = step_days(monday, i64::from(week) * 7)?;
            let row: Vec<HeatmapCell> = first_day
                .iter_days()
                .take(WEEKDAY_LABELS.len())
                .map(|date| Self::day_cell(forecast, date, today, today_hours, full_day_hours))
                .collect();
            let row: [HeatmapCell; 5] = row.try_into().map_err(|short: Vec<HeatmapCell>| {
                ForecastError::DateOutOfRange {
                    from: first_day,
                    days: short.len() as i64,
                }
            })?;
            rows.push(row);
        }

        Ok(Self { weeks: rows })
    }

    fn day_cell(
        forecast: &Forecast,
        date: NaiveDate,
        today: NaiveDate,
        today_hours: f64,
        full_day_hours: f64,
    ) -> HeatmapCell {
        let is_today = date == today;
        if date < today {
            return HeatmapCell {
                date,
                is_today,
                hours: None,
                color: None,
            };
        }
        let hours = forecast.hours_on(date);
        let high = if is_today { today_hours } else { full_day_hours };
        HeatmapCell {
            date,
            is_today,
            hours: Some(hours),
            color: Some(green_red_scale(0.0, high, hours)),
        }
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&HeatmapCell> {
        self.weeks
            .iter()
            .flat_map(|week| week.iter())
            .find(|cell| cell.date == date)
    }

    /// Plain-text rendering: a date row and a load row per week, today marked with `*`.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for label in WEEKDAY_LABELS {
            let _ = write!(out, "{label:>8}");
        }
        out.push('\n');

        for week in &self.weeks {
            for cell in week {
                let marker = if cell.is_today { "*" } else { " " };
                let _ = write!(out, "{:>7}{marker}", cell.date.format("%b %d").to_string());
            }
            out.push('\n');
            for cell in week {
                match cell.hours {
                    Some(hours) => {
                        let _ = write!(out, "{hours:>7.1} ");
                    }
                    None => out.push_str("        "),
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Linear green-to-red colour for `value` on `[low, high]`, as `#RRGGBB`.
pub fn green_red_scale(low: f64, high: f64, value: f64) -> String {
    let span = high - low;
    let frac = if span > 0.0 {
        ((value - low) / span).clamp(0.0, 1.0)
    } else if value > low {
        1.0
    } else {
        0.0
    };

    let (red, green) = if frac > 0.5 {
        (255, ((2.0 - 2.0 * frac) * 255.0) as u8)
    } else {
        (((2.0 * frac) * 255.0) as u8, 255)
    };
    format!("#{red:02x}{green:02x}00")
}
