use crate::data::{ConfigFile, HolidayTable, Persistable};
use anyhow::Result;

pub fn run() -> Result<()> {
    let table = ConfigFile::load()?.holiday_table();
    write_holidays(&table, &mut std::io::stdout())
}

pub(crate) fn write_holidays<W: std::io::Write>(table: &HolidayTable, out: &mut W) -> Result<()> {
    writeln!(out, "Holidays")?;
    writeln!(out, "---")?;
    writeln!(out, "  {:<14} {}", "Date", "Name")?;
    for h in table.holidays() {
        writeln!(out, "  {:<14} {}", h.date.format("%Y-%m-%d"), h.name)?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} holiday(s)", table.holidays().len())?;
    Ok(())
}
