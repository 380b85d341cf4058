use crate::data::HolidayTable;
use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => d,
        None => panic!("invalid calendar constant"),
    }
}

/// First selectable date of the scheduling cycle.
pub const MIN_DATE: NaiveDate = ymd(2025, 12, 1);
/// Last selectable date of the scheduling cycle.
pub const MAX_DATE: NaiveDate = ymd(2026, 12, 31);

/// A calendar month. Ordering is chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self> {
        let (y, m) = match s.trim().split_once('-') {
            Some(parts) => parts,
            None => bail!("expected YYYY-MM, got '{}'", s),
        };
        let year: i32 = y.parse().map_err(|_| anyhow::anyhow!("invalid year in '{}'", s))?;
        let month: u32 = m.parse().map_err(|_| anyhow::anyhow!("invalid month in '{}'", s))?;
        match YearMonth::new(year, month) {
            Some(ym) => Ok(ym),
            None => bail!("month out of range in '{}'", s),
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            YearMonth { year: self.year + 1, month: 1 }
        } else {
            YearMonth { year: self.year, month: self.month + 1 }
        }
    }

    pub fn pred(self) -> Self {
        if self.month == 1 {
            YearMonth { year: self.year - 1, month: 12 }
        } else {
            YearMonth { year: self.year, month: self.month - 1 }
        }
    }

    pub fn days_in_month(self) -> u32 {
        let next = self.succ();
        match (next.first_day(), self.first_day()) {
            (Some(n), Some(f)) => n.signed_duration_since(f).num_days() as u32,
            _ => 0,
        }
    }

    /// Weekday index of the 1st, 0 = Sunday.
    pub fn leading_blanks(self) -> usize {
        self.first_day()
            .map(|d| d.weekday().num_days_from_sunday() as usize)
            .unwrap_or(0)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", month_name(self.month), self.year)
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The fixed selectable range plus its holiday annotations.
#[derive(Clone, Debug)]
pub struct CalendarWindow {
    min: NaiveDate,
    max: NaiveDate,
    holidays: HolidayTable,
}

impl CalendarWindow {
    /// The Dec 2025 - Dec 2026 window.
    pub fn standard(holidays: HolidayTable) -> Self {
        CalendarWindow {
            min: MIN_DATE,
            max: MAX_DATE,
            holidays,
        }
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max
    }

    pub fn min_month(&self) -> YearMonth {
        YearMonth::of(self.min)
    }

    pub fn max_month(&self) -> YearMonth {
        YearMonth::of(self.max)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min && date <= self.max
    }

    pub fn contains_month(&self, month: YearMonth) -> bool {
        month >= self.min_month() && month <= self.max_month()
    }

    pub fn holiday_label(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.label_for(date)
    }

    pub fn clamp_month(&self, month: YearMonth) -> YearMonth {
        month.clamp(self.min_month(), self.max_month())
    }
}

/// Render metadata for one day of the visible month.
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell<'a> {
    pub day: u32,
    pub date: NaiveDate,
    pub is_past: bool,
    pub is_weekend: bool,
    pub holiday: Option<&'a str>,
    pub is_selected: bool,
}

impl DayCell<'_> {
    /// Past cells never accept clicks, whatever their selection state.
    pub fn is_interactive(&self) -> bool {
        !self.is_past
    }
}

/// Builds the grid for `month`: one `None` per leading blank (weekday index of
/// the 1st, Sunday first), then one cell per day.
pub fn month_grid<'a>(
    window: &'a CalendarWindow,
    month: YearMonth,
    today: NaiveDate,
    selected: &[NaiveDate],
) -> Vec<Option<DayCell<'a>>> {
    let mut cells: Vec<Option<DayCell<'a>>> = vec![None; month.leading_blanks()];
    for day in 1..=month.days_in_month() {
        let date = match NaiveDate::from_ymd_opt(month.year, month.month, day) {
            Some(d) => d,
            None => continue,
        };
        cells.push(Some(DayCell {
            day,
            date,
            is_past: date < today,
            is_weekend: is_weekend(date),
            holiday: window.holiday_label(date),
            is_selected: selected.contains(&date),
        }));
    }
    cells
}

/// Which month is on screen, and the selection count it last followed.
#[derive(Clone, Debug)]
pub struct CalendarView {
    month: YearMonth,
    followed_count: usize,
}

impl CalendarView {
    pub fn new(month: YearMonth) -> Self {
        CalendarView {
            month,
            followed_count: 0,
        }
    }

    /// Opens on the month containing `today`, pulled into the window.
    pub fn starting_at(window: &CalendarWindow, today: NaiveDate) -> Self {
        Self::new(window.clamp_month(YearMonth::of(today)))
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn can_prev(&self, window: &CalendarWindow) -> bool {
        window.contains_month(self.month.pred())
    }

    pub fn can_next(&self, window: &CalendarWindow) -> bool {
        window.contains_month(self.month.succ())
    }

    /// Returns false and leaves the view alone when the move would leave the window.
    pub fn prev_month(&mut self, window: &CalendarWindow) -> bool {
        if !self.can_prev(window) {
            tracing::debug!(month = %self.month, "prev month rejected at window start");
            return false;
        }
        self.month = self.month.pred();
        true
    }

    pub fn next_month(&mut self, window: &CalendarWindow) -> bool {
        if !self.can_next(window) {
            tracing::debug!(month = %self.month, "next month rejected at window end");
            return false;
        }
        self.month = self.month.succ();
        true
    }

    /// Follows the selection only when its size changed: the view jumps to
    /// the month of the last (latest) selected date.
    pub fn follow_selection(&mut self, selected: &[NaiveDate]) {
        if selected.len() == self.followed_count {
            return;
        }
        self.followed_count = selected.len();
        if let Some(last) = selected.last() {
            self.month = YearMonth::of(*last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn window() -> CalendarWindow {
        CalendarWindow::standard(HolidayTable::builtin())
    }

    #[test]
    fn test_constants() {
        assert_eq!(MIN_DATE, d(2025, 12, 1));
        assert_eq!(MAX_DATE, d(2026, 12, 31));
    }

    #[test]
    fn test_year_month_succ_pred_across_year() {
        assert_eq!(ym(2025, 12).succ(), ym(2026, 1));
        assert_eq!(ym(2026, 1).pred(), ym(2025, 12));
        assert_eq!(ym(2026, 5).succ(), ym(2026, 6));
    }

    #[test]
    fn test_year_month_rejects_bad_month() {
        assert!(YearMonth::new(2026, 0).is_none());
        assert!(YearMonth::new(2026, 13).is_none());
    }

    #[test]
    fn test_year_month_parse() {
        assert_eq!(YearMonth::parse("2026-02").unwrap(), ym(2026, 2));
        assert!(YearMonth::parse("2026").is_err());
        assert!(YearMonth::parse("2026-13").is_err());
        assert!(YearMonth::parse("abcd-01").is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(ym(2026, 1).days_in_month(), 31);
        assert_eq!(ym(2026, 2).days_in_month(), 28);
        assert_eq!(ym(2028, 2).days_in_month(), 29);
        assert_eq!(ym(2026, 4).days_in_month(), 30);
        assert_eq!(ym(2025, 12).days_in_month(), 31);
    }

    #[test]
    fn test_display() {
        assert_eq!(ym(2025, 12).to_string(), "December 2025");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_grid_leading_blanks_match_first_weekday() {
        let w = window();
        // 2026-02-01 is a Sunday, 2026-01-01 a Thursday
        let feb = month_grid(&w, ym(2026, 2), d(2025, 12, 1), &[]);
        assert!(feb[0].is_some());
        assert_eq!(feb.len(), 28);

        let jan = month_grid(&w, ym(2026, 1), d(2025, 12, 1), &[]);
        assert_eq!(jan.iter().take_while(|c| c.is_none()).count(), 4);
        assert_eq!(jan.len(), 4 + 31);
    }

    #[test]
    fn test_grid_cell_metadata() {
        let w = window();
        let today = d(2026, 2, 10);
        let selected = [d(2026, 2, 18)];
        let grid = month_grid(&w, ym(2026, 2), today, &selected);
        let cell = |day: u32| {
            grid.iter()
                .flatten()
                .find(|c| c.day == day)
                .cloned()
                .unwrap()
        };

        let past = cell(9);
        assert!(past.is_past);
        assert!(!past.is_interactive());

        assert!(!cell(10).is_past, "today is not past");

        let eve = cell(17);
        assert_eq!(eve.holiday, Some("除夕"));
        assert!(!eve.is_weekend);

        let sat = cell(21);
        assert!(sat.is_weekend);
        assert_eq!(sat.holiday, None);

        assert!(cell(18).is_selected);
        assert!(!cell(19).is_selected);
    }

    #[test]
    fn test_prev_rejected_at_first_month() {
        let w = window();
        let mut view = CalendarView::new(ym(2025, 12));
        assert!(!view.can_prev(&w));
        assert!(!view.prev_month(&w));
        assert_eq!(view.month(), ym(2025, 12));
    }

    #[test]
    fn test_next_rejected_at_last_month() {
        let w = window();
        let mut view = CalendarView::new(ym(2026, 12));
        assert!(!view.can_next(&w));
        assert!(!view.next_month(&w));
        assert_eq!(view.month(), ym(2026, 12));
    }

    #[test]
    fn test_months_between_navigate_both_ways() {
        let w = window();
        let mut m = ym(2026, 1);
        while m < ym(2026, 12) {
            let mut view = CalendarView::new(m);
            assert!(view.next_month(&w));
            assert_eq!(view.month(), m.succ());
            assert!(view.prev_month(&w));
            assert_eq!(view.month(), m);
            assert!(view.prev_month(&w));
            assert_eq!(view.month(), m.pred());
            m = m.succ();
        }
    }

    #[test]
    fn test_walk_full_window() {
        let w = window();
        let mut view = CalendarView::new(ym(2025, 12));
        let mut steps = 0;
        while view.next_month(&w) {
            steps += 1;
        }
        assert_eq!(steps, 12);
        assert_eq!(view.month(), ym(2026, 12));
    }

    #[test]
    fn test_starting_month_clamped_to_window() {
        let w = window();
        assert_eq!(CalendarView::starting_at(&w, d(2025, 6, 1)).month(), ym(2025, 12));
        assert_eq!(CalendarView::starting_at(&w, d(2026, 10, 16)).month(), ym(2026, 10));
        assert_eq!(CalendarView::starting_at(&w, d(2027, 3, 1)).month(), ym(2026, 12));
    }

    #[test]
    fn test_follow_selection_only_on_count_change() {
        let w = window();
        let mut view = CalendarView::new(ym(2026, 1));

        view.follow_selection(&[d(2026, 3, 4)]);
        assert_eq!(view.month(), ym(2026, 3));

        // user browses away; same count must not pull the view back
        view.next_month(&w);
        view.follow_selection(&[d(2026, 3, 5)]);
        assert_eq!(view.month(), ym(2026, 4));

        view.follow_selection(&[d(2026, 3, 5), d(2026, 7, 1)]);
        assert_eq!(view.month(), ym(2026, 7));
    }

    #[test]
    fn test_follow_selection_to_empty_keeps_month() {
        let mut view = CalendarView::new(ym(2026, 1));
        view.follow_selection(&[d(2026, 5, 4)]);
        view.follow_selection(&[]);
        assert_eq!(view.month(), ym(2026, 5));
    }
}
