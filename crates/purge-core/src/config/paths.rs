//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use super::ConfigScope;

pub const CONFIG_FILE_NAME: &str = "purge.toml";

pub fn config_path_for_scope(
    scope: ConfigScope,
    global_dir: &Path,
    project_root: &Path,
) -> PathBuf {
    match scope {
        ConfigScope::Global => global_dir.join(CONFIG_FILE_NAME),
        ConfigScope::Project => project_root.join(CONFIG_FILE_NAME),
    }
}

/// `<config dir>/purge`
pub fn default_global_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("purge"))
}
