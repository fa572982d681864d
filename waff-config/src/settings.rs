//! Feature flipper settings.

use crate::env::EnvLoader;
use crate::loader::{ConfigLoader, FileFormat};
use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use waff_log::debug;

/// Process-wide settings, built once at startup and shared by reference.
///
/// Templates use `%s` as the placeholder for the flag, switch or sample
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaffSettings {
    /// Result for flags with no stored record
    pub flag_default: bool,
    /// Result for switches with no stored record
    pub switch_default: bool,
    /// Result for samples with no stored record
    pub sample_default: bool,
    /// Honour `?<flag>=1|0` query overrides
    pub override_enabled: bool,

    /// Percentage decision cookie name
    pub cookie: String,
    /// Testing-mode cookie and query parameter name
    pub test_cookie: String,
    /// Mark decision cookies `Secure`
    pub secure: bool,
    /// Lifetime of persistent decision cookies, in seconds
    pub max_age: u64,

    pub cache_prefix: String,
    pub flag_cache_key: String,
    pub flag_users_cache_key: String,
    pub flag_groups_cache_key: String,
    pub switch_cache_key: String,
    pub sample_cache_key: String,
    pub all_flags_cache_key: String,
    pub all_switches_cache_key: String,
    pub all_samples_cache_key: String,

    /// Resolve flags through environment buckets instead of the store
    pub use_env_vars: bool,
}

impl Default for WaffSettings {
    fn default() -> Self {
        Self {
            flag_default: false,
            switch_default: false,
            sample_default: false,
            override_enabled: false,
            cookie: "dwf_%s".to_string(),
            test_cookie: "dwft_%s".to_string(),
            secure: true,
            max_age: 2_592_000,
            cache_prefix: "waffle:".to_string(),
            flag_cache_key: "flag:%s".to_string(),
            flag_users_cache_key: "flag:%s:users".to_string(),
            flag_groups_cache_key: "flag:%s:groups".to_string(),
            switch_cache_key: "switch:%s".to_string(),
            sample_cache_key: "sample:%s".to_string(),
            all_flags_cache_key: "flags:all".to_string(),
            all_switches_cache_key: "switches:all".to_string(),
            all_samples_cache_key: "samples:all".to_string(),
            use_env_vars: true,
        }
    }
}

impl WaffSettings {
    /// Read `WAFF_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_loader(&EnvLoader::new(Some("WAFF".to_string())))
    }

    /// Load a `.env` file into the process environment first, ignoring a
    /// missing default file.
    pub fn from_dotenv(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    /// Overlay values found through `env` on top of the defaults.
    pub fn from_env_loader(env: &EnvLoader) -> Result<Self> {
        let mut settings = Self::default();

        macro_rules! overlay_bool {
            ($($field:ident => $key:literal),* $(,)?) => {
                $(if let Some(value) = env.load_bool($key)? {
                    settings.$field = value;
                })*
            };
        }
        macro_rules! overlay_string {
            ($($field:ident => $key:literal),* $(,)?) => {
                $(if let Some(value) = env.get($key) {
                    settings.$field = value;
                })*
            };
        }

        overlay_bool! {
            flag_default => "FLAG_DEFAULT",
            switch_default => "SWITCH_DEFAULT",
            sample_default => "SAMPLE_DEFAULT",
            override_enabled => "OVERRIDE",
            secure => "SECURE",
            use_env_vars => "USE_ENV_VARS",
        }
        overlay_string! {
            cookie => "COOKIE",
            test_cookie => "TEST_COOKIE",
            cache_prefix => "CACHE_PREFIX",
            flag_cache_key => "FLAG_CACHE_KEY",
            flag_users_cache_key => "FLAG_USERS_CACHE_KEY",
            flag_groups_cache_key => "FLAG_GROUPS_CACHE_KEY",
            switch_cache_key => "SWITCH_CACHE_KEY",
            sample_cache_key => "SAMPLE_CACHE_KEY",
            all_flags_cache_key => "ALL_FLAGS_CACHE_KEY",
            all_switches_cache_key => "ALL_SWITCHES_CACHE_KEY",
            all_samples_cache_key => "ALL_SAMPLES_CACHE_KEY",
        }
        if let Some(max_age) = env.load_parsed("MAX_AGE")? {
            settings.max_age = max_age;
        }

        settings.validate()?;
        debug!(
            "waff settings loaded (use_env_vars={}, override={})",
            settings.use_env_vars, settings.override_enabled
        );
        Ok(settings)
    }

    /// Load from a JSON, TOML or `.env` file, picked by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let value = loader.load_file(path)?;

        if FileFormat::from_extension(
            path.extension().and_then(|e| e.to_str()).unwrap_or_default(),
        ) == Some(FileFormat::Env)
        {
            let vars: Vec<(String, String)> = value
                .as_object()
                .into_iter()
                .flatten()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.to_uppercase(), v.to_string())))
                .collect();
            return Self::from_env_loader(&EnvLoader::from_map(None, vars));
        }

        Self::from_value(value)
    }

    /// Deserialize from an already parsed value; missing fields keep their
    /// defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let settings: Self = serde_json::from_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Substitute `name` into a `%s` template.
    pub fn format_name(template: &str, name: &str) -> String {
        template.replacen("%s", name, 1)
    }

    pub fn flag_cookie(&self, flag: &str) -> String {
        Self::format_name(&self.cookie, flag)
    }

    pub fn test_cookie_name(&self, flag: &str) -> String {
        Self::format_name(&self.test_cookie, flag)
    }
}

impl Validate for WaffSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::single_placeholder(&self.cookie, "cookie")?;
        ConfigValidator::single_placeholder(&self.test_cookie, "test_cookie")?;
        for (template, field) in [
            (&self.flag_cache_key, "flag_cache_key"),
            (&self.flag_users_cache_key, "flag_users_cache_key"),
            (&self.flag_groups_cache_key, "flag_groups_cache_key"),
            (&self.switch_cache_key, "switch_cache_key"),
            (&self.sample_cache_key, "sample_cache_key"),
        ] {
            ConfigValidator::single_placeholder(template, field)?;
        }
        for (key, field) in [
            (&self.all_flags_cache_key, "all_flags_cache_key"),
            (&self.all_switches_cache_key, "all_switches_cache_key"),
            (&self.all_samples_cache_key, "all_samples_cache_key"),
        ] {
            ConfigValidator::not_empty(key, field)?;
        }
        if self.cookie == self.test_cookie {
            return Err(ConfigError::ValidationError(
                "cookie and test_cookie must differ".to_string(),
            ));
        }
        if self.max_age == 0 {
            return Err(ConfigError::ValidationError(
                "max_age must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> EnvLoader {
        EnvLoader::from_map(Some("WAFF".to_string()), vars.iter().copied())
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = WaffSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.flag_cookie("foo"), "dwf_foo");
        assert_eq!(settings.test_cookie_name("foo"), "dwft_foo");
        assert_eq!(settings.max_age, 30 * 24 * 60 * 60);
        assert!(settings.use_env_vars);
    }

    #[test]
    fn test_env_overlay() {
        let settings = WaffSettings::from_env_loader(&env(&[
            ("WAFF_OVERRIDE", "1"),
            ("WAFF_SWITCH_DEFAULT", "true"),
            ("WAFF_USE_ENV_VARS", "false"),
            ("WAFF_COOKIE", "ff_%s"),
            ("WAFF_MAX_AGE", "3600"),
        ]))
        .unwrap();

        assert!(settings.override_enabled);
        assert!(settings.switch_default);
        assert!(!settings.use_env_vars);
        assert_eq!(settings.flag_cookie("x"), "ff_x");
        assert_eq!(settings.max_age, 3600);
        assert!(!settings.flag_default);
    }

    #[test]
    fn test_env_overlay_rejects_bad_values() {
        assert!(WaffSettings::from_env_loader(&env(&[("WAFF_SECURE", "sometimes")])).is_err());
        assert!(WaffSettings::from_env_loader(&env(&[("WAFF_MAX_AGE", "-1")])).is_err());
        assert!(WaffSettings::from_env_loader(&env(&[("WAFF_COOKIE", "static")])).is_err());
    }

    #[test]
    fn test_from_value_keeps_defaults() {
        let settings =
            WaffSettings::from_value(serde_json::json!({ "flag_default": true })).unwrap();
        assert!(settings.flag_default);
        assert_eq!(settings.cache_prefix, "waffle:");
    }

    #[test]
    fn test_validate_rejects_shared_cookie_names() {
        let settings = WaffSettings {
            test_cookie: "dwf_%s".to_string(),
            ..WaffSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_format_name_replaces_first_placeholder() {
        assert_eq!(WaffSettings::format_name("flag:%s:users", "beta"), "flag:beta:users");
    }
}
