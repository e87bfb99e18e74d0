use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use purge_core::config::{ConfigLayers, ConfigScope, ConfigStore, PurgeConfig};

fn layers(temp: &TempDir) -> ConfigLayers {
    ConfigLayers::new(temp.path().join("config"), temp.path().join("project"))
}

#[test]
fn load_missing_returns_empty_config() {
    let temp = TempDir::new().unwrap();

    let config = layers(&temp).store(ConfigScope::Global).load().unwrap();

    assert_eq!(config, PurgeConfig::default());
}

#[test]
fn scopes_map_to_their_directories() {
    let temp = TempDir::new().unwrap();
    let layers = layers(&temp);

    assert_eq!(
        layers.store(ConfigScope::Global).config_path(),
        temp.path().join("config/purge.toml")
    );
    assert_eq!(
        layers.store(ConfigScope::Project).config_path(),
        temp.path().join("project/purge.toml")
    );
}

#[test]
fn update_creates_the_file_and_keeps_other_keys() {
    let temp = TempDir::new().unwrap();
    let store = layers(&temp).store(ConfigScope::Global);

    store.update(|config| config.threads = Some(6)).unwrap();
    let updated = store
        .update(|config| config.store_root = Some(PathBuf::from("/srv/store")))
        .unwrap();

    assert_eq!(updated.threads, Some(6));
    assert_eq!(store.load().unwrap(), updated);
    let text = fs::read_to_string(temp.path().join("config/purge.toml")).unwrap();
    assert!(text.contains("threads = 6"), "{text}");
}

#[test]
fn invalid_update_leaves_the_file_alone() {
    let temp = TempDir::new().unwrap();
    let store = layers(&temp).store(ConfigScope::Project);
    fs::create_dir_all(temp.path().join("project")).unwrap();
    fs::write(store.config_path(), "threads = 4\n").unwrap();

    assert!(store.update(|config| config.threads = Some(0)).is_err());

    assert_eq!(
        fs::read_to_string(store.config_path()).unwrap(),
        "threads = 4\n"
    );
}

#[test]
fn invalid_update_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_file(temp.path().join("purge.toml"));

    assert!(store.update(|config| config.spill_threshold = Some(0)).is_err());
    assert!(!store.config_path().exists());
}

#[test]
fn project_layer_overrides_global_layer() {
    let temp = TempDir::new().unwrap();
    let layers = layers(&temp);
    fs::create_dir_all(temp.path().join("config")).unwrap();
    fs::create_dir_all(temp.path().join("project")).unwrap();
    fs::write(
        temp.path().join("config/purge.toml"),
        "threads = 10\ndry_run = true\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("project/purge.toml"),
        "threads = 2\nstore_root = \"store\"\n",
    )
    .unwrap();

    let merged = layers.load_merged().unwrap();

    assert_eq!(merged.threads_or_default(), 2);
    assert!(merged.dry_run_or_default());
    assert_eq!(merged.store_root, Some(temp.path().join("project/store")));
}

#[test]
fn invalid_file_reports_path() {
    let temp = TempDir::new().unwrap();
    let store = layers(&temp).store(ConfigScope::Project);
    fs::create_dir_all(temp.path().join("project")).unwrap();
    fs::write(store.config_path(), "threads = \"many\"\n").unwrap();

    let err = format!("{:#}", store.load().unwrap_err());

    assert!(err.contains("purge.toml"), "{err}");
    assert!(err.contains("line 1"), "{err}");
}
