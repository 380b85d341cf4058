//! Display strings for the domain enums. The enums themselves carry no text.

use crate::data::{DurationMode, HalfDayPeriod, LeaveType};

pub fn leave_type_label(t: LeaveType) -> &'static str {
    match t {
        LeaveType::Annual => "年假 (Annual Leave)",
        LeaveType::Sick => "病假 (Sick Leave)",
        LeaveType::Birthday => "生日假 (Birthday Leave)",
    }
}

/// Short label for the statistics panel.
pub fn bucket_label(t: LeaveType) -> &'static str {
    match t {
        LeaveType::Annual => "Annual (年假)",
        LeaveType::Sick => "Sick (病假)",
        LeaveType::Birthday => "Birthday (生日假)",
    }
}

pub fn duration_mode_label(m: DurationMode) -> &'static str {
    match m {
        DurationMode::FullDay => "整天 (Full Day)",
        DurationMode::HalfDay => "半天 (Half Day)",
        DurationMode::Hourly => "選小時 (Hourly)",
    }
}

pub fn half_day_label(p: HalfDayPeriod) -> &'static str {
    match p {
        HalfDayPeriod::Am => "AM",
        HalfDayPeriod::Pm => "PM",
    }
}

pub fn half_day_label_zh(p: HalfDayPeriod) -> &'static str {
    match p {
        HalfDayPeriod::Am => "上午",
        HalfDayPeriod::Pm => "下午",
    }
}

/// `2.00` -> `2`, `1.50` -> `1.5`.
pub fn format_days(days: f64) -> String {
    let s = format!("{:.2}", days);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
