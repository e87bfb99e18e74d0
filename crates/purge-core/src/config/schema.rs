//! Configuration schema for purge.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::DEFAULT_THREADS;
use crate::stream::DEFAULT_SPILL_THRESHOLD;

/// Root configuration structure for purge.toml
///
/// Every field is optional so a layer only overrides what it sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Concurrent delete calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Paths kept in memory before buffering to a temp file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spill_threshold: Option<usize>,

    /// Directory served as the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl PurgeConfig {
    pub fn threads_or_default(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }

    pub fn spill_threshold_or_default(&self) -> usize {
        self.spill_threshold.unwrap_or(DEFAULT_SPILL_THRESHOLD)
    }

    pub fn dry_run_or_default(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Take every field that `layer` sets.
    pub fn overlay(&mut self, layer: PurgeConfig) {
        if layer.threads.is_some() {
            self.threads = layer.threads;
        }
        if layer.spill_threshold.is_some() {
            self.spill_threshold = layer.spill_threshold;
        }
        if layer.store_root.is_some() {
            self.store_root = layer.store_root;
        }
        if layer.dry_run.is_some() {
            self.dry_run = layer.dry_run;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.threads == Some(0) {
            anyhow::bail!("Invalid configuration: 'threads' must be at least 1");
        }
        if self.spill_threshold == Some(0) {
            anyhow::bail!("Invalid configuration: 'spill_threshold' must be at least 1");
        }
        if let Some(root) = &self.store_root
            && root.as_os_str().is_empty()
        {
            anyhow::bail!("Invalid configuration: 'store_root' must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = PurgeConfig::default();
        assert_eq!(config.threads_or_default(), 3);
        assert_eq!(config.spill_threshold_or_default(), DEFAULT_SPILL_THRESHOLD);
        assert!(!config.dry_run_or_default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overlay_keeps_unset_fields() {
        let mut config = PurgeConfig {
            threads: Some(8),
            dry_run: Some(true),
            ..Default::default()
        };

        config.overlay(PurgeConfig {
            threads: Some(2),
            spill_threshold: Some(500),
            ..Default::default()
        });

        assert_eq!(config.threads, Some(2));
        assert_eq!(config.spill_threshold, Some(500));
        assert_eq!(config.dry_run, Some(true));
        assert!(!config.is_empty());
        assert!(PurgeConfig::default().is_empty());
    }

    #[test]
    fn zero_values_are_invalid() {
        let threads = PurgeConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert!(threads.validate().unwrap_err().to_string().contains("threads"));

        let spill = PurgeConfig {
            spill_threshold: Some(0),
            ..Default::default()
        };
        assert!(spill.validate().unwrap_err().to_string().contains("spill_threshold"));
    }
}
