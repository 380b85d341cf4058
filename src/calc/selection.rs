use chrono::NaiveDate;

/// Applies one calendar click to `dates`.
///
/// Single mode replaces the whole selection; multi mode toggles `date`.
/// Either way the result is re-sorted ascending. No range validation happens
/// here: past or out-of-window dates are filtered by the calendar first.
pub fn select(dates: &mut Vec<NaiveDate>, date: NaiveDate, multi: bool) {
    if multi {
        if let Some(pos) = dates.iter().position(|d| *d == date) {
            dates.remove(pos);
        } else {
            dates.push(date);
        }
    } else {
        dates.clear();
        dates.push(date);
    }
    dates.sort();
}
