//! Integration tests for waff-config

use std::io::Write;
use waff_config::*;

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_settings_from_toml_file() {
    let file = write_file(
        ".toml",
        r#"
        override_enabled = true
        cookie = "ff_%s"
        cache_prefix = "shop:"
        "#,
    );

    let settings = WaffSettings::from_file(file.path()).unwrap();
    assert!(settings.override_enabled);
    assert_eq!(settings.flag_cookie("beta"), "ff_beta");
    assert_eq!(settings.cache_prefix, "shop:");
    assert_eq!(settings.test_cookie, "dwft_%s");
}

#[test]
fn test_settings_from_json_file() {
    let file = write_file(".json", r#"{"sample_default": true, "max_age": 60}"#);

    let settings = WaffSettings::from_file(file.path()).unwrap();
    assert!(settings.sample_default);
    assert_eq!(settings.max_age, 60);
}

#[test]
fn test_settings_from_env_file() {
    let file = write_file(".env", "FLAG_DEFAULT=true\nSECURE=0\n");

    let settings = WaffSettings::from_file(file.path()).unwrap();
    assert!(settings.flag_default);
    assert!(!settings.secure);
}

#[test]
fn test_invalid_file_settings_rejected() {
    let file = write_file(".json", r#"{"cookie": "no-placeholder"}"#);
    assert!(matches!(
        WaffSettings::from_file(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let file = write_file(".yaml", "cookie: x");
    assert!(matches!(
        WaffSettings::from_file(file.path()),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_buckets_and_settings_share_a_loader() {
    let env = EnvLoader::from_map(
        Some("WAFF".to_string()),
        [
            ("WAFF_BETA_USERS", "carol"),
            ("WAFF_BETA_FLAGS", "reports"),
            ("WAFF_USE_ENV_VARS", "yes"),
        ],
    );

    let settings = WaffSettings::from_env_loader(&env).unwrap();
    let buckets = EnvBuckets::from_env_loader(&env);

    assert!(settings.use_env_vars);
    assert!(buckets.is_beta_flag("reports"));
    assert!(buckets.is_beta_user("carol"));
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidValue {
        key: "WAFF_SECURE".to_string(),
        value: "sometimes".to_string(),
    };
    assert!(err.to_string().contains("WAFF_SECURE"));
}
