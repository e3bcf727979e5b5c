use anyhow::{Context, Result};
use std::path::PathBuf;

const DB_ENV: &str = "RENOTRACK_DB";

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
}

impl Config {
    pub(crate) fn load() -> Result<Self> {
        let db_override = std::env::var(DB_ENV).ok();
        let db_path = resolve_db_path(db_override.as_deref(), default_db_path)?;
        tracing::debug!(path = %db_path.display(), "resolved database path");
        Ok(Self { db_path })
    }
}

/// Explicit path wins; otherwise `default` supplies the path. The parent
/// directory is created if missing.
fn resolve_db_path(
    db_override: Option<&str>,
    default: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    let path = match db_override.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => PathBuf::from(crate::run::shellexpand(p)),
        None => default()?,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    }
    Ok(path)
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "renotrack", "RenoTrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().join("renotrack.db"))
}
