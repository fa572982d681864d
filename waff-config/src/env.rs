// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Where variables are read from.
#[derive(Debug, Clone)]
enum Source {
    Process,
    Fixed(HashMap<String, String>),
}

/// Environment variable loader.
///
/// Keys are upper-cased and joined to the prefix with `_`, so
/// `EnvLoader::new(Some("WAFF".into())).load_var("alpha_users")` reads
/// `WAFF_ALPHA_USERS`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
    source: Source,
}

impl EnvLoader {
    /// Read from the process environment.
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix,
            source: Source::Process,
        }
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn from_map<I, K, V>(prefix: Option<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix,
            source: Source::Fixed(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    fn lookup(&self, full_key: &str) -> Option<String> {
        match self.source {
            Source::Process => env::var(full_key).ok(),
            Source::Fixed(ref vars) => vars.get(full_key).cloned(),
        }
    }

    /// Load a specific variable.
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = self.full_key(key);
        self.lookup(&full_key).ok_or(ConfigError::NotSet(full_key))
    }

    /// Load a variable, or `None` when unset.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lookup(&self.full_key(key))
    }

    /// Load a comma separated list. Unset or empty yields an empty list and
    /// empty items are dropped.
    pub fn load_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(|v| parse_list(&v)).unwrap_or_default()
    }

    /// Load a boolean, `None` when unset.
    pub fn load_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            Some(value) => parse_bool(&value)
                .map(Some)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: self.full_key(key),
                    value,
                }),
            None => Ok(None),
        }
    }

    /// Load and parse a number, `None` when unset.
    pub fn load_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: self.full_key(key),
                    value,
                }),
            None => Ok(None),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Split `a,b,,c` into `["a", "b", "c"]`.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Interpret common boolean spellings.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
