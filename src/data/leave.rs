use crate::calc::selection;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Category of absence; doubles as the ledger bucket key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Birthday,
}

impl LeaveType {
    pub const ALL: [LeaveType; 3] = [LeaveType::Annual, LeaveType::Sick, LeaveType::Birthday];
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    #[default]
    FullDay,
    HalfDay,
    Hourly,
}

impl DurationMode {
    pub const ALL: [DurationMode; 3] = [
        DurationMode::FullDay,
        DurationMode::HalfDay,
        DurationMode::Hourly,
    ];
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HalfDayPeriod {
    #[default]
    Am,
    Pm,
}

pub(crate) fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// The in-progress draft collected across the first three wizard steps.
///
/// `dates` is kept unique by calendar day and sorted ascending; it is only
/// mutated through [`LeaveRequest::select_date`].
#[derive(Clone, Debug, PartialEq)]
pub struct LeaveRequest {
    pub leave_type: Option<LeaveType>,
    dates: Vec<NaiveDate>,
    pub duration_mode: DurationMode,
    /// Only meaningful when `duration_mode` is `HalfDay`.
    pub half_day_period: HalfDayPeriod,
    /// Only meaningful when `duration_mode` is `Hourly`.
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Default for LeaveRequest {
    fn default() -> Self {
        LeaveRequest {
            leave_type: None,
            dates: Vec::new(),
            duration_mode: DurationMode::FullDay,
            half_day_period: HalfDayPeriod::Am,
            start_time: default_start_time(),
            end_time: default_end_time(),
        }
    }
}

impl LeaveRequest {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn select_date(&mut self, date: NaiveDate, multi: bool) {
        selection::select(&mut self.dates, date, multi);
    }

    pub fn half_day_period_if_active(&self) -> Option<HalfDayPeriod> {
        (self.duration_mode == DurationMode::HalfDay).then_some(self.half_day_period)
    }

    pub fn hours_if_active(&self) -> Option<(NaiveTime, NaiveTime)> {
        (self.duration_mode == DurationMode::Hourly).then_some((self.start_time, self.end_time))
    }

    /// Human-readable list of the selected dates, e.g. `2026/01/05, 2026/01/06`.
    pub fn date_label(&self) -> String {
        format_dates(&self.dates)
    }
}

pub fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format("%Y/%m/%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
