//! Reading and updating purge.toml files.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{ConfigScope, PurgeConfig, merge_configs, parser, paths};

/// One purge.toml file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// The file for `scope` in the default locations.
    pub fn from_scope(scope: ConfigScope) -> anyhow::Result<Self> {
        Ok(ConfigLayers::discover()?.store(scope))
    }

    pub fn from_paths(scope: ConfigScope, global_dir: &Path, project_root: &Path) -> Self {
        Self::from_file(paths::config_path_for_scope(scope, global_dir, project_root))
    }

    pub fn from_file(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// A missing file loads as the empty config.
    pub fn load(&self) -> anyhow::Result<PurgeConfig> {
        if !self.config_path.exists() {
            return Ok(PurgeConfig::default());
        }
        parser::parse_purge_toml(&self.config_path)
    }

    /// Load the file, apply `edit` and write the result back.
    ///
    /// Nothing is written if the edited config is invalid.
    pub fn update<F>(&self, edit: F) -> anyhow::Result<PurgeConfig>
    where
        F: FnOnce(&mut PurgeConfig),
    {
        let mut config = self.load()?;
        edit(&mut config);
        self.save(&config)?;
        Ok(config)
    }

    /// Replace the file with `config`.
    ///
    /// The new content goes to a temp file next to the target first, so a
    /// failed write leaves the old file in place.
    pub fn save(&self, config: &PurgeConfig) -> anyhow::Result<()> {
        config.validate()?;
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;

        let dir = match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let mut staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to stage config in {}", dir.display()))?;
        staged
            .write_all(content.as_bytes())
            .context("Failed to write staged config")?;
        staged
            .persist(&self.config_path)
            .map_err(|e| e.error)
            .with_context(|| {
                format!("Failed to write config file: {}", self.config_path.display())
            })?;
        debug!(path = %self.config_path.display(), "saved config");
        Ok(())
    }
}

/// The global and project config files, read together.
#[derive(Debug, Clone)]
pub struct ConfigLayers {
    global_dir: PathBuf,
    project_root: PathBuf,
}

impl ConfigLayers {
    /// The per-user config directory and the current directory.
    pub fn discover() -> anyhow::Result<Self> {
        let global_dir = paths::default_global_dir()?;
        let project_root =
            std::env::current_dir().context("Failed to determine current directory")?;
        Ok(Self::new(global_dir, project_root))
    }

    pub fn new(global_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: global_dir.into(),
            project_root: project_root.into(),
        }
    }

    pub fn store(&self, scope: ConfigScope) -> ConfigStore {
        ConfigStore::from_paths(scope, &self.global_dir, &self.project_root)
    }

    /// Both layers merged, project values first.
    pub fn load_merged(&self) -> anyhow::Result<PurgeConfig> {
        let global = self.store(ConfigScope::Global).load()?;
        let project = self.store(ConfigScope::Project).load()?;
        Ok(merge_configs(
            Some(global),
            Some(project),
            &self.global_dir,
            &self.project_root,
        ))
    }
}
