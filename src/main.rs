mod calc;
mod cmd;
mod data;
mod draft;
mod logging;
mod mail;
mod ui;
mod wizard;

use clap::{Parser, Subcommand};
use cmd::quote::{QuoteArgs, QuoteMode, QuotePeriod};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leave-wizard", about = "step-by-step leave requests")]
struct Cli {
    /// Path to the data directory containing config.yaml and the log (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config.yaml
    Init,
    /// List all holidays
    Holidays,
    /// Print the calendar for one month of the selectable window
    Month {
        /// Month key (e.g. 2026-02)
        month: String,
    },
    /// Show how many days a request would be charged
    Quote {
        #[arg(long, value_enum, default_value_t = QuoteMode::Full)]
        mode: QuoteMode,
        /// Half-day period, used with --mode half
        #[arg(long, value_enum, default_value_t = QuotePeriod::Am)]
        period: QuotePeriod,
        /// Start time HH:MM, used with --mode hourly (default 09:00)
        #[arg(long)]
        start: Option<String>,
        /// End time HH:MM, used with --mode hourly (default 18:00)
        #[arg(long)]
        end: Option<String>,
        /// Dates as YYYY-MM-DD
        #[arg(required = true)]
        dates: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Checked before the log file lands in the directory.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    let needs_init = !is_init_command && dir_needs_init(&data_dir);

    logging::init(&data_dir)?;

    if needs_init {
        eprintln!(
            "Data directory '{}' is missing or empty, running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    match cli.command {
        None => cmd::root::run(),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Holidays) => cmd::holidays::run(),
        Some(Commands::Month { month }) => cmd::month::run(&month),
        Some(Commands::Quote {
            mode,
            period,
            start,
            end,
            dates,
        }) => cmd::quote::run(QuoteArgs {
            mode,
            period,
            start: start.as_deref(),
            end: end.as_deref(),
            dates: &dates,
        }),
    }
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dir_needs_init_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does_not_exist");
        assert!(dir_needs_init(&missing));
    }

    #[test]
    fn test_dir_needs_init_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_dir_needs_init_nonempty_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.yaml"), "settings: {}").unwrap();
        assert!(!dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_cli_parses_quote() {
        let cli = Cli::try_parse_from([
            "leave-wizard",
            "quote",
            "--mode",
            "hourly",
            "--start",
            "09:00",
            "--end",
            "13:00",
            "2026-04-07",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Quote { mode, start, dates, .. }) => {
                assert_eq!(mode, QuoteMode::Hourly);
                assert_eq!(start.as_deref(), Some("09:00"));
                assert_eq!(dates, vec!["2026-04-07".to_string()]);
            }
            _ => panic!("expected quote"),
        }
    }

    #[test]
    fn test_cli_quote_requires_dates() {
        assert!(Cli::try_parse_from(["leave-wizard", "quote"]).is_err());
    }

    #[test]
    fn test_cli_default_data_dir() {
        let cli = Cli::try_parse_from(["leave-wizard"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("./config"));
        assert!(cli.command.is_none());
    }
}
