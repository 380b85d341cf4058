use crate::calc::duration::{compute_days, unit_days};
use crate::data::labels::{duration_mode_label, format_days, half_day_label};
use crate::data::leave::format_dates;
use crate::data::{DurationMode, HalfDayPeriod, LeaveRequest};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QuoteMode {
    Full,
    Half,
    Hourly,
}

impl From<QuoteMode> for DurationMode {
    fn from(m: QuoteMode) -> Self {
        match m {
            QuoteMode::Full => DurationMode::FullDay,
            QuoteMode::Half => DurationMode::HalfDay,
            QuoteMode::Hourly => DurationMode::Hourly,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QuotePeriod {
    Am,
    Pm,
}

impl From<QuotePeriod> for HalfDayPeriod {
    fn from(p: QuotePeriod) -> Self {
        match p {
            QuotePeriod::Am => HalfDayPeriod::Am,
            QuotePeriod::Pm => HalfDayPeriod::Pm,
        }
    }
}

pub struct QuoteArgs<'a> {
    pub mode: QuoteMode,
    pub period: QuotePeriod,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub dates: &'a [String],
}

pub fn run(args: QuoteArgs) -> Result<()> {
    let request = build_request(&args)?;
    write_quote(&request, &mut std::io::stdout())
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("invalid time '{}', expected HH:MM", s))
}

pub(crate) fn build_request(args: &QuoteArgs) -> Result<LeaveRequest> {
    let mut request = LeaveRequest::default();
    request.duration_mode = args.mode.into();
    request.half_day_period = args.period.into();
    if let Some(s) = args.start {
        request.start_time = parse_time(s)?;
    }
    if let Some(e) = args.end {
        request.end_time = parse_time(e)?;
    }
    // Repeated dates on the command line name the same day once.
    for raw in args.dates {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", raw))?;
        if !request.dates().contains(&date) {
            request.select_date(date, true);
        }
    }
    Ok(request)
}

pub(crate) fn write_quote<W: std::io::Write>(request: &LeaveRequest, out: &mut W) -> Result<()> {
    let mode = match request.duration_mode {
        DurationMode::HalfDay => format!(
            "{} {}",
            duration_mode_label(request.duration_mode),
            half_day_label(request.half_day_period)
        ),
        DurationMode::Hourly => format!(
            "{} {} ~ {}",
            duration_mode_label(request.duration_mode),
            request.start_time.format("%H:%M"),
            request.end_time.format("%H:%M")
        ),
        DurationMode::FullDay => duration_mode_label(request.duration_mode).to_string(),
    };
    writeln!(out, "Dates:    {}", format_dates(request.dates()))?;
    writeln!(out, "Mode:     {}", mode)?;
    writeln!(out, "Per date: {}", format_days(unit_days(request)))?;
    writeln!(out, "---")?;
    writeln!(out, "Total:    {} day(s)", format_days(compute_days(request)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(mode: QuoteMode, dates: &'a [String]) -> QuoteArgs<'a> {
        QuoteArgs {
            mode,
            period: QuotePeriod::Am,
            start: None,
            end: None,
            dates,
        }
    }

    fn quote(a: &QuoteArgs) -> String {
        let mut buf = Vec::new();
        write_quote(&build_request(a).unwrap(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_full_day_two_dates() {
        let dates = vec!["2026-01-06".to_string(), "2026-01-05".to_string()];
        let out = quote(&args(QuoteMode::Full, &dates));
        assert!(out.contains("Dates:    2026/01/05, 2026/01/06"));
        assert!(out.contains("Total:    2 day(s)"));
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let dates = vec![
            "2026-01-05".to_string(),
            "2026-01-06".to_string(),
            "2026-01-05".to_string(),
        ];
        let a = args(QuoteMode::Full, &dates);
        let request = build_request(&a).unwrap();
        assert_eq!(request.dates().len(), 2);
        assert!(quote(&a).contains("Total:    2 day(s)"));
    }

    #[test]
    fn test_half_day_shows_period() {
        let dates = vec!["2026-01-05".to_string()];
        let mut a = args(QuoteMode::Half, &dates);
        a.period = QuotePeriod::Pm;
        let out = quote(&a);
        assert!(out.contains("PM"));
        assert!(out.contains("Total:    0.5 day(s)"));
    }

    #[test]
    fn test_hourly_morning() {
        let dates = vec!["2026-04-07".to_string()];
        let mut a = args(QuoteMode::Hourly, &dates);
        a.start = Some("09:00");
        a.end = Some("13:00");
        let out = quote(&a);
        assert!(out.contains("09:00 ~ 13:00"));
        assert!(out.contains("Per date: 0.5"));
        assert!(out.contains("Total:    0.5 day(s)"));
    }

    #[test]
    fn test_hourly_inverted_interval_is_zero() {
        let dates = vec!["2026-04-07".to_string()];
        let mut a = args(QuoteMode::Hourly, &dates);
        a.start = Some("14:00");
        a.end = Some("10:00");
        assert!(quote(&a).contains("Total:    0 day(s)"));
    }

    #[test]
    fn test_bad_date_is_error() {
        let dates = vec!["05/01/2026".to_string()];
        let err = build_request(&args(QuoteMode::Full, &dates)).err().unwrap();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_bad_time_is_error() {
        let dates = vec!["2026-04-07".to_string()];
        let mut a = args(QuoteMode::Hourly, &dates);
        a.start = Some("9am");
        assert!(build_request(&a).is_err());
    }
}
