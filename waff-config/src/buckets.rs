//! Environment buckets.
//!
//! There are three buckets: ALPHA, BETA and ALL. ALPHA and BETA flags are
//! only active for the users named in the matching user list; ALL flags are
//! active for everyone. Nothing configured means every flag is off.

use crate::env::EnvLoader;
use serde::{Deserialize, Serialize};

/// Bucket lists read from `WAFF_*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvBuckets {
    pub alpha_users: Vec<String>,
    pub beta_users: Vec<String>,
    pub alpha_flags: Vec<String>,
    pub beta_flags: Vec<String>,
    pub all_flags: Vec<String>,
    /// Switches that are on
    pub switches: Vec<String>,
    /// Samples that are on
    pub samples: Vec<String>,
}

impl EnvBuckets {
    /// Read the bucket lists from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_loader(&EnvLoader::new(Some("WAFF".to_string())))
    }

    pub fn from_env_loader(env: &EnvLoader) -> Self {
        Self {
            alpha_users: env.load_list("ALPHA_USERS"),
            beta_users: env.load_list("BETA_USERS"),
            alpha_flags: env.load_list("ALPHA_FLAGS"),
            beta_flags: env.load_list("BETA_FLAGS"),
            all_flags: env.load_list("ALL_FLAGS"),
            switches: env.load_list("SWITCHES"),
            samples: env.load_list("SAMPLES"),
        }
    }

    /// Whether any flag list is populated.
    pub fn has_flags(&self) -> bool {
        !(self.alpha_flags.is_empty() && self.beta_flags.is_empty() && self.all_flags.is_empty())
    }

    pub fn is_all_flag(&self, flag: &str) -> bool {
        contains(&self.all_flags, flag)
    }

    pub fn is_alpha_flag(&self, flag: &str) -> bool {
        contains(&self.alpha_flags, flag)
    }

    pub fn is_beta_flag(&self, flag: &str) -> bool {
        contains(&self.beta_flags, flag)
    }

    pub fn is_alpha_user(&self, username: &str) -> bool {
        contains(&self.alpha_users, username)
    }

    pub fn is_beta_user(&self, username: &str) -> bool {
        contains(&self.beta_users, username)
    }

    /// Every flag named in any bucket, deduplicated, in first-seen order.
    pub fn flag_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self
            .all_flags
            .iter()
            .chain(&self.alpha_flags)
            .chain(&self.beta_flags)
        {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

fn contains(list: &[String], item: &str) -> bool {
    list.iter().any(|entry| entry == item)
}
