//! Configuration for the purge CLI
//!
//! Two scopes are read and merged:
//! - Global: `<config dir>/purge/purge.toml`
//! - Project: `./purge.toml`, overriding global values

pub mod merge;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use serde::{Deserialize, Serialize};

pub use merge::merge_configs;
pub use parser::{parse_purge_toml, parse_purge_toml_str, to_toml};
pub use paths::config_path_for_scope;
pub use schema::PurgeConfig;
pub use store::{ConfigLayers, ConfigStore};

/// Configuration scope levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigScope {
    /// Per-user configuration
    Global,
    /// Per-project configuration in the working directory
    Project,
}
