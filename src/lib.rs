pub mod calendar;
pub mod capacity;
pub mod config;
pub mod due_date;
pub mod forecast;
pub mod frame;
pub mod heatmap;
pub mod holidays;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod task;
pub mod task_validation;
pub mod worklist;

pub use calendar::{DayOff, DayOffReason, WorkDayCalendar};
pub use capacity::{CapacityPolicy, DailyCapacityPolicy};
pub use config::WorklistConfig;
pub use due_date::DueDate;
pub use forecast::{AsapPolicy, Forecast, ForecastError, WorkloadForecast, forecast};
pub use heatmap::HeatmapGrid;
pub use task::{Task, TaskId};
pub use worklist::{Worklist, WorklistError};
