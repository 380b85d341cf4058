use crate::data::{ConfigFile, HolidayTable, Persistable};
use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir)?;
    println!("Config written to {}.", dir.join(ConfigFile::filename()).display());
    Ok(())
}

/// Writes the default config.yaml into `dir`. The built-in holidays are
/// spelled out so they can be edited in place.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    let config = ConfigFile {
        holidays: Some(HolidayTable::builtin().holidays().to_vec()),
        ..ConfigFile::default()
    };
    config.save_to(dir)?;
    tracing::info!(dir = %dir.display(), "default config written");
    Ok(())
}
