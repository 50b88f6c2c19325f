use dedupe::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.prehash_size, 4096);
    assert_eq!(config.channel_capacity, 64);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
prehash_size = 1024
channel_capacity = 8
skip_hidden = true
follow_symlinks = true
ignore_patterns = ["*.tmp", "target/"]
permanent_delete = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load(Some(config_path.as_path())).unwrap();

    assert_eq!(config.prehash_size, 1024);
    assert_eq!(config.channel_capacity, 8);
    assert!(config.skip_hidden);
    assert!(config.follow_symlinks);
    assert!(config.permanent_delete);
    assert!(!config.csv_header);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "target/"]);
}

#[test]
fn test_config_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "csv_header = false\nprehash_size = 100\n").unwrap();

    // Unique prefix so parallel tests reading DEDUPE_ are not affected
    std::env::set_var("DEDUPE_LAYER_TEST_CSV_HEADER", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DEDUPE_LAYER_TEST_"))
        .extract()
        .unwrap();

    std::env::remove_var("DEDUPE_LAYER_TEST_CSV_HEADER");

    assert!(config.csv_header);
    assert_eq!(config.prehash_size, 100);
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("does_not_exist.toml");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    let result = Config::load(Some(config_path.as_path()));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_wrong_type_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "prehash_size = \"big\"\n").unwrap();

    assert!(Config::load(Some(config_path.as_path())).is_err());
}

#[test]
fn test_config_save_then_load() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        skip_empty: true,
        ignore_patterns: vec!["*.log".to_string()],
        ..Config::default()
    };
    config.save(&config_path).unwrap();

    let loaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(loaded, config);
}
