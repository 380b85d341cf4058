use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const LOG_FILE: &str = "leave-wizard.log";

/// Used when `RUST_LOG` is unset, blank or unparsable.
const DEFAULT_DIRECTIVE: &str = "leave_wizard=info";

pub fn log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE)
}

/// Sends tracing output to `<dir>/leave-wizard.log`. The terminal belongs to
/// the TUI, so nothing is logged to stdout or stderr. `RUST_LOG` replaces
/// the default `leave_wizard=info` filter.
pub fn init(dir: &Path) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    fs::create_dir_all(dir).with_context(|| format!("failed to create dir {}", dir.display()))?;
    let path = log_path(dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    fmt()
        .with_env_filter(build_filter(directives.as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;
    Ok(())
}

fn build_filter(directives: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
