//! Integration tests for config loading across all file formats.

use std::path::Path;
use std::time::Duration;

use courier::client::Courier;
use courier::config::model::Config;
use courier::config::sources::{self, parse_config_str};
use courier::config::validation::validate;
use courier::error::CourierError;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("courier.yaml");
    let config = parse_config_str("yaml", &content, "courier.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.remotes.len(), 2);
    assert_eq!(config.total_addresses(), 3);
    assert!(config.enable_metrics);
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("courier.json");
    let config = parse_config_str("json", &content, "courier.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.http_timeout["svcA"]["/slow"], 5000);
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("courier.toml");
    let config = parse_config_str("toml", &content, "courier.toml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.remote_default_timeout("svcA"), 1000);
}

#[cfg(all(feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equal_configs() {
    let yaml: Config = parse_config_str("yaml", &load_example("courier.yaml"), "yaml").unwrap();
    let json: Config = parse_config_str("json", &load_example("courier.json"), "json").unwrap();
    let toml: Config = parse_config_str("toml", &load_example("courier.toml"), "toml").unwrap();
    assert_eq!(yaml, json);
    assert_eq!(yaml, toml);
}

#[test]
fn unsupported_extension_is_rejected() {
    let err = parse_config_str("ini", "", "courier.ini").unwrap_err();
    assert!(matches!(err, CourierError::UnsupportedFormat(ext) if ext == "ini"));
    assert!(sources::for_path(Path::new("courier.ini")).is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = parse_config_str("yaml", "remotes: {}\nroutes: []\n", "bad.yaml").unwrap_err();
    assert!(matches!(err, CourierError::ConfigParse { .. }));
}

#[tokio::test]
async fn file_source_loads_and_hashes() {
    let source = sources::resolve(Some(Path::new("example/courier.yaml")))
        .await
        .unwrap();
    assert_eq!(source.name(), "yaml");

    let (config, version) = source.load().await.unwrap();
    let (_, again) = source.load().await.unwrap();
    assert_eq!(version, again);
    assert_eq!(version.short().len(), 8);

    let courier = Courier::new(config).unwrap();
    assert_eq!(
        courier.timeouts().resolve("svcA", "/SLOW"),
        Duration::from_millis(5000)
    );
    assert_eq!(
        courier.timeouts().resolve("svcA", "/other"),
        Duration::from_millis(1000)
    );
    assert_eq!(
        courier.timeouts().resolve("billing", "/other"),
        Duration::from_millis(3000)
    );
    assert_eq!(courier.registry().addresses("svcA").map(<[String]>::len), Some(2));
}

#[tokio::test]
async fn missing_file_is_reported() {
    let source = sources::resolve(Some(Path::new("example/missing.yaml")))
        .await
        .unwrap();
    let err = source.load().await.unwrap_err();
    assert!(matches!(err, CourierError::ConfigFileNotFound { .. }));
}

#[tokio::test]
async fn invalid_file_fails_validation() {
    let dir = std::env::temp_dir().join(format!("courier-cfg-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("courier.yaml");
    std::fs::write(
        &path,
        "remotes:\n  users: []\nhttpTimeout:\n  Users:\n    default: 0\n",
    )
    .unwrap();

    let err = sources::resolve(Some(&path))
        .await
        .unwrap()
        .load()
        .await
        .unwrap_err();
    let CourierError::ConfigValidation { errors } = err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| e.suggestion.as_deref() == Some("did you mean 'users'?")));

    std::fs::remove_dir_all(&dir).unwrap();
}
