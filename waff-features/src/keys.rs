//! Cache key formatting.
//!
//! Per-name keys hash the formatted template so arbitrary flag names stay
//! within backend key limits. Listing keys are used as-is.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use waff_config::WaffSettings;

#[derive(Debug, Clone)]
pub struct CacheKeys {
    settings: Arc<WaffSettings>,
}

impl CacheKeys {
    pub fn new(settings: Arc<WaffSettings>) -> Self {
        Self { settings }
    }

    pub fn flag(&self, name: &str) -> String {
        self.hashed(&self.settings.flag_cache_key, name)
    }

    pub fn flag_users(&self, name: &str) -> String {
        self.hashed(&self.settings.flag_users_cache_key, name)
    }

    pub fn flag_groups(&self, name: &str) -> String {
        self.hashed(&self.settings.flag_groups_cache_key, name)
    }

    pub fn switch(&self, name: &str) -> String {
        self.hashed(&self.settings.switch_cache_key, name)
    }

    pub fn sample(&self, name: &str) -> String {
        self.hashed(&self.settings.sample_cache_key, name)
    }

    pub fn all_flags(&self) -> String {
        self.plain(&self.settings.all_flags_cache_key)
    }

    pub fn all_switches(&self) -> String {
        self.plain(&self.settings.all_switches_cache_key)
    }

    pub fn all_samples(&self) -> String {
        self.plain(&self.settings.all_samples_cache_key)
    }

    fn hashed(&self, template: &str, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(WaffSettings::format_name(template, name).as_bytes());
        format!("{}{}", self.settings.cache_prefix, hex::encode(hasher.finalize()))
    }

    fn plain(&self, key: &str) -> String {
        format!("{}{}", self.settings.cache_prefix, key)
    }
}
