use crate::data::{DurationMode, LeaveRequest};
use chrono::NaiveTime;

/// Hours in a standard workday; an hourly request is charged against this.
pub const STANDARD_WORKDAY_HOURS: f64 = 8.0;

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fraction of a day one selected date costs for an hourly request.
/// A non-positive interval costs nothing.
pub fn hourly_unit(start: NaiveTime, end: NaiveTime) -> f64 {
    let minutes = (end - start).num_minutes();
    if minutes <= 0 {
        return 0.0;
    }
    minutes as f64 / 60.0 / STANDARD_WORKDAY_HOURS
}

pub fn unit_days(request: &LeaveRequest) -> f64 {
    match request.duration_mode {
        DurationMode::FullDay => 1.0,
        DurationMode::HalfDay => 0.5,
        DurationMode::Hourly => hourly_unit(request.start_time, request.end_time),
    }
}

/// Day quantity charged for `request`, rounded to two decimals.
pub fn compute_days(request: &LeaveRequest) -> f64 {
    let count = request.dates().len();
    if count == 0 {
        return 0.0;
    }
    round2(unit_days(request) * count as f64)
}
