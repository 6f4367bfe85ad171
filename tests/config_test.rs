use std::io::Write;

use zksdk_stats::StatsConfig;

#[test]
fn test_config_from_file_with_packages() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "registry_url": "http://127.0.0.1:9999",
            "refresh_interval_secs": 60,
            "packages": [
                {{ "name": "zkmerkle", "registry_id": "zkmerkle" }}
            ]
        }}"#
    )
    .unwrap();

    let config = StatsConfig::from_file(file.path()).unwrap();
    assert_eq!(config.registry_url, "http://127.0.0.1:9999");
    assert_eq!(config.refresh_interval_secs, 60);
    assert_eq!(config.fallback_display, "1,276");

    let packages = config.packages();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].install_command(), "npm i zkmerkle");
    assert!(packages[0].title.is_empty());
}

#[test]
fn test_config_rejects_empty_package_list() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "packages": [] }}"#).unwrap();
    assert!(StatsConfig::from_file(file.path()).is_err());
}

#[test]
fn test_config_missing_file() {
    let err = StatsConfig::from_file("/nonexistent/zksdk-stats.json").unwrap_err();
    assert!(err.to_string().contains("read config"));
}

#[test]
fn test_config_registry_headers_and_timeout() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "registry_headers": {{ "x-registry-key": "secret" }}, "request_timeout_secs": 3 }}"#
    )
    .unwrap();
    let config = StatsConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.registry_headers.get("x-registry-key").map(String::as_str),
        Some("secret")
    );
    assert_eq!(config.request_timeout().as_secs(), 3);

    let mut zero = tempfile::NamedTempFile::new().unwrap();
    write!(zero, r#"{{ "request_timeout_secs": 0 }}"#).unwrap();
    assert!(StatsConfig::from_file(zero.path()).is_err());
}
