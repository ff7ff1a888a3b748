use actionpin::config::*;
use tempfile::TempDir;

#[test]
fn test_default_config_has_workflow_patterns() {
    let config = PinConfig::default();
    assert!(config.include.iter().any(|p| p == "*.yml"));
    assert!(config.include.iter().any(|p| p == "*.yaml"));
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn test_load_config_without_path_returns_defaults() {
    let config = load_config(None).unwrap();
    assert_eq!(config, PinConfig::default());
}

#[test]
fn test_load_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILENAME);
    std::fs::write(&path, r#"{"api_base_url": "https://ghe.example.com/api/v3"}"#).unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.api_base_url, "https://ghe.example.com/api/v3");
    assert_eq!(config.include, PinConfig::default().include);
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn test_load_config_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILENAME);
    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_config(Some(&path)).is_err());
}

#[test]
fn test_load_config_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_config(Some(&dir.path().join("missing.json"))).is_err());
}

#[test]
fn test_should_include_file() {
    let config = PinConfig::default();
    assert!(should_include_file("ci.yml", &config));
    assert!(should_include_file("release.yaml", &config));
    assert!(!should_include_file("README.md", &config));
    assert!(!should_include_file("ci.yml.bak", &config));
}

#[test]
fn test_exclude_takes_precedence() {
    let config = PinConfig {
        exclude: vec!["generated-*".to_string()],
        ..PinConfig::default()
    };
    assert!(!should_include_file("generated-ci.yml", &config));
    assert!(should_include_file("ci.yml", &config));
}
