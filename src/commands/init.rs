use std::path::{Path, PathBuf};
use tracing::info;
use crate::config::MigrateConfig;
use crate::error::Result;

/// Write permigrate.toml.example into `dir`
pub fn execute_init(dir: &Path) -> Result<PathBuf> {
    let path = MigrateConfig::write_sample_config(dir)?;
    info!("Sample configuration written to {}", path.display());
    Ok(path)
}
