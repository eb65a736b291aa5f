use chrono::{NaiveDate, NaiveTime};

/// Upper bound on the minutes that may be planned for a single day.
pub trait CapacityPolicy {
    fn max_minutes_for(&self, date: NaiveDate, today: NaiveDate, now: NaiveTime) -> f64;
}

/// Today is capped by the time left until the end of the workday (never above
/// `today_ceiling_minutes`); every other day gets a flat `future_day_minutes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyCapacityPolicy {
    end_of_day: NaiveTime,
    today_ceiling_minutes: f64,
    future_day_minutes: f64,
}

impl DailyCapacityPolicy {
    pub const DEFAULT_END_OF_DAY_HOUR: u32 = 16;
    pub const DEFAULT_TODAY_CEILING_MINUTES: f64 = 7.0 * 60.0;
    pub const DEFAULT_FUTURE_DAY_MINUTES: f64 = 6.0 * 60.0;

    pub fn new(end_of_day: NaiveTime, today_ceiling_minutes: f64, future_day_minutes: f64) -> Self {
        Self {
            end_of_day,
            today_ceiling_minutes: today_ceiling_minutes.max(0.0),
            future_day_minutes: future_day_minutes.max(0.0),
        }
    }

    pub fn end_of_day(&self) -> NaiveTime {
        self.end_of_day
    }

    pub fn today_ceiling_minutes(&self) -> f64 {
        self.today_ceiling_minutes
    }

    pub fn future_day_minutes(&self) -> f64 {
        self.future_day_minutes
    }

    /// Minutes between `now` and the end of the workday, clamped to `[0, today_ceiling]`.
    pub fn minutes_left_today(&self, now: NaiveTime) -> f64 {
        let left = self.end_of_day.signed_duration_since(now).num_minutes() as f64;
        left.clamp(0.0, self.today_ceiling_minutes)
    }
}

impl Default for DailyCapacityPolicy {
    fn default() -> Self {
        let end_of_day = NaiveTime::from_hms_opt(Self::DEFAULT_END_OF_DAY_HOUR, 0, 0)
            .unwrap_or(NaiveTime::MIN);
        Self::new(
            end_of_day,
            Self::DEFAULT_TODAY_CEILING_MINUTES,
            Self::DEFAULT_FUTURE_DAY_MINUTES,
        )
    }
}

impl CapacityPolicy for DailyCapacityPolicy {
    fn max_minutes_for(&self, date: NaiveDate, today: NaiveDate, now: NaiveTime) -> f64 {
        if date == today {
            self.minutes_left_today(now)
        } else {
            self.future_day_minutes
        }
    }
}

impl<P: CapacityPolicy + ?Sized> CapacityPolicy for &P {
    fn max_minutes_for(&self, date: NaiveDate, today: NaiveDate, now: NaiveTime) -> f64 {
        (**self).max_minutes_for(date, today, now)
    }
}
