//! Layering of global and project configuration.

use std::path::Path;

use super::PurgeConfig;

/// Merge the global and project layers.
///
/// Project values win field by field. A relative `store_root` is resolved
/// against the directory of the layer that set it: `project_root` for the
/// project layer, the global config directory for the global layer.
pub fn merge_configs(
    global: Option<PurgeConfig>,
    project: Option<PurgeConfig>,
    global_dir: &Path,
    project_root: &Path,
) -> PurgeConfig {
    let mut merged = PurgeConfig::default();
    for (layer, base) in [(global, global_dir), (project, project_root)] {
        if let Some(mut layer) = layer {
            layer.store_root = layer.store_root.map(|root| base.join(root));
            merged.overlay(layer);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn project_overrides_global_per_field() {
        let global = PurgeConfig {
            threads: Some(8),
            spill_threshold: Some(100),
            ..Default::default()
        };
        let project = PurgeConfig {
            threads: Some(2),
            dry_run: Some(true),
            ..Default::default()
        };

        let merged = merge_configs(
            Some(global),
            Some(project),
            Path::new("/cfg"),
            Path::new("/proj"),
        );

        assert_eq!(merged.threads, Some(2));
        assert_eq!(merged.spill_threshold, Some(100));
        assert_eq!(merged.dry_run, Some(true));
    }

    #[test]
    fn relative_store_root_follows_its_layer() {
        let global = PurgeConfig {
            store_root: Some(PathBuf::from("store")),
            ..Default::default()
        };
        let merged = merge_configs(
            Some(global.clone()),
            None,
            Path::new("/cfg"),
            Path::new("/proj"),
        );
        assert_eq!(merged.store_root, Some(PathBuf::from("/cfg/store")));

        let project = PurgeConfig {
            store_root: Some(PathBuf::from("artifacts")),
            ..Default::default()
        };
        let merged = merge_configs(
            Some(global),
            Some(project),
            Path::new("/cfg"),
            Path::new("/proj"),
        );
        assert_eq!(merged.store_root, Some(PathBuf::from("/proj/artifacts")));
    }

    #[test]
    fn nothing_to_merge() {
        let merged = merge_configs(None, None, Path::new("/cfg"), Path::new("/proj"));
        assert_eq!(merged, PurgeConfig::default());
    }
}
