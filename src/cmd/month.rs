use crate::calc::calendar::{month_grid, CalendarWindow, DayCell, YearMonth};
use crate::data::{ConfigFile, Persistable};
use anyhow::{bail, Result};
use chrono::Local;

pub fn run(month_key: &str) -> Result<()> {
    let month = YearMonth::parse(month_key)?;
    let window = CalendarWindow::standard(ConfigFile::load()?.holiday_table());
    let today = Local::now().date_naive();
    write_month(&window, month, today, &mut std::io::stdout())
}

/// One-character marker after the day number. Past wins over holiday, holiday
/// over weekend.
fn marker(cell: &DayCell) -> char {
    if cell.is_past {
        'x'
    } else if cell.holiday.is_some() {
        '*'
    } else if cell.is_weekend {
        '~'
    } else {
        ' '
    }
}

pub(crate) fn write_month<W: std::io::Write>(
    window: &CalendarWindow,
    month: YearMonth,
    today: chrono::NaiveDate,
    out: &mut W,
) -> Result<()> {
    if !window.contains_month(month) {
        bail!(
            "{} is outside the calendar window ({} - {})",
            month,
            window.min_month(),
            window.max_month()
        );
    }

    let cells = month_grid(window, month, today, &[]);

    writeln!(out, "{:^28}", month.to_string())?;
    writeln!(out, " Su  Mo  Tu  We  Th  Fr  Sa")?;
    for week in cells.chunks(7) {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(c) => line.push_str(&format!(" {:>2}{}", c.day, marker(c))),
                None => line.push_str("    "),
            }
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    let holidays: Vec<_> = cells
        .iter()
        .flatten()
        .filter_map(|c| c.holiday.map(|h| (c.date, h)))
        .collect();
    writeln!(out, "---")?;
    for (date, name) in &holidays {
        writeln!(out, "  {:<14} {}", date.format("%Y-%m-%d"), name)?;
    }
    writeln!(out, "Legend: * holiday  ~ weekend  x past")?;
    Ok(())
}
