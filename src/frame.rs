//! Tabular views for display and export.

use crate::forecast::Forecast;
use crate::task::Task;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Days from 0001-01-01 (day 1 in the common era) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Days since 1970-01-01, the physical representation of a polars `Date`.
fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

fn date_column(name: &'static str, dates: Vec<Option<i32>>) -> PolarsResult<Column> {
    Ok(Series::new(PlSmallStr::from_static(name), dates)
        .cast(&DataType::Date)?
        .into_column())
}

/// One row per forecast day: `date`, `minutes`, `hours`, in date order.
pub fn forecast_to_dataframe(forecast: &Forecast) -> PolarsResult<DataFrame> {
    let mut dates = Vec::with_capacity(forecast.len());
    let mut minutes = Vec::with_capacity(forecast.len());
    let mut hours = Vec::with_capacity(forecast.len());
    for (date, planned) in forecast.iter() {
        dates.push(Some(date_to_i32(date)));
        minutes.push(planned);
        hours.push(planned / 60.0);
    }

    DataFrame::new(vec![
        date_column("date", dates)?,
        Series::new(PlSmallStr::from_static("minutes"), minutes).into_column(),
        Series::new(PlSmallStr::from_static("hours"), hours).into_column(),
    ])
}

pub fn tasks_to_dataframe(tasks: &[Task]) -> PolarsResult<DataFrame> {
    let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    let categories: Vec<&str> = tasks.iter().map(|t| t.category.as_str()).collect();
    let finished: Vec<bool> = tasks.iter().map(|t| t.finished).collect();
    let needed: Vec<u32> = tasks.iter().map(|t| t.time_needed).collect();
    let used: Vec<u32> = tasks.iter().map(|t| t.time_used).collect();
    let remaining: Vec<u32> = tasks.iter().map(Task::remaining_minutes).collect();
    let starts: Vec<Option<i32>> = tasks
        .iter()
        .map(|t| Some(date_to_i32(t.earliest_start)))
        .collect();
    let dues: Vec<String> = tasks.iter().map(|t| t.due.to_string()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("category"), categories).into_column(),
        Series::new(PlSmallStr::from_static("finished"), finished).into_column(),
        Series::new(PlSmallStr::from_static("time_needed"), needed).into_column(),
        Series::new(PlSmallStr::from_static("time_used"), used).into_column(),
        Series::new(PlSmallStr::from_static("remaining"), remaining).into_column(),
        date_column("earliest_start", starts)?,
        Series::new(PlSmallStr::from_static("due"), dues).into_column(),
    ])
}
