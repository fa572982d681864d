//! Persistence seam for flag records.

use crate::error::StoreResult;
use crate::models::{Flag, Sample, Switch};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use waff_core::{GroupId, UserId};

/// Source of truth for flags, switches and samples.
///
/// Lookups return `Ok(None)` for records that do not exist; errors are
/// reserved for backend failures.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn flag(&self, name: &str) -> StoreResult<Option<Flag>>;

    /// Ids of users explicitly attached to the flag.
    async fn flag_users(&self, name: &str) -> StoreResult<Vec<UserId>>;

    /// Ids of groups explicitly attached to the flag.
    async fn flag_groups(&self, name: &str) -> StoreResult<Vec<GroupId>>;

    async fn switch(&self, name: &str) -> StoreResult<Option<Switch>>;

    async fn sample(&self, name: &str) -> StoreResult<Option<Sample>>;

    async fn flag_names(&self) -> StoreResult<Vec<String>>;

    async fn switches(&self) -> StoreResult<Vec<Switch>>;

    async fn sample_names(&self) -> StoreResult<Vec<String>>;
}

#[derive(Debug, Default)]
struct Records {
    flags: BTreeMap<String, Flag>,
    flag_users: BTreeMap<String, BTreeSet<UserId>>,
    flag_groups: BTreeMap<String, BTreeSet<GroupId>>,
    switches: BTreeMap<String, Switch>,
    samples: BTreeMap<String, Sample>,
}

/// Process-local store.
///
/// Writes do not touch any cache; call the matching `uncache_*` hook on
/// the evaluator after changing a record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlagStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a flag. Attached users and groups are kept.
    pub fn insert_flag(&self, flag: Flag) {
        self.records.write().flags.insert(flag.name.clone(), flag);
    }

    /// Remove a flag together with its user and group attachments.
    pub fn remove_flag(&self, name: &str) -> Option<Flag> {
        let mut records = self.records.write();
        records.flag_users.remove(name);
        records.flag_groups.remove(name);
        records.flags.remove(name)
    }

    pub fn add_flag_user(&self, flag: &str, user: UserId) {
        self.records
            .write()
            .flag_users
            .entry(flag.to_string())
            .or_default()
            .insert(user);
    }

    pub fn remove_flag_user(&self, flag: &str, user: UserId) -> bool {
        self.records
            .write()
            .flag_users
            .get_mut(flag)
            .is_some_and(|users| users.remove(&user))
    }

    pub fn add_flag_group(&self, flag: &str, group: GroupId) {
        self.records
            .write()
            .flag_groups
            .entry(flag.to_string())
            .or_default()
            .insert(group);
    }

    pub fn remove_flag_group(&self, flag: &str, group: GroupId) -> bool {
        self.records
            .write()
            .flag_groups
            .get_mut(flag)
            .is_some_and(|groups| groups.remove(&group))
    }

    pub fn insert_switch(&self, switch: Switch) {
        self.records
            .write()
            .switches
            .insert(switch.name.clone(), switch);
    }

    pub fn remove_switch(&self, name: &str) -> Option<Switch> {
        self.records.write().switches.remove(name)
    }

    pub fn insert_sample(&self, sample: Sample) {
        self.records
            .write()
            .samples
            .insert(sample.name.clone(), sample);
    }

    pub fn remove_sample(&self, name: &str) -> Option<Sample> {
        self.records.write().samples.remove(name)
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn flag(&self, name: &str) -> StoreResult<Option<Flag>> {
        Ok(self.records.read().flags.get(name).cloned())
    }

    async fn flag_users(&self, name: &str) -> StoreResult<Vec<UserId>> {
        Ok(self
            .records
            .read()
            .flag_users
            .get(name)
            .map(|users| users.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn flag_groups(&self, name: &str) -> StoreResult<Vec<GroupId>> {
        Ok(self
            .records
            .read()
            .flag_groups
            .get(name)
            .map(|groups| groups.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn switch(&self, name: &str) -> StoreResult<Option<Switch>> {
        Ok(self.records.read().switches.get(name).cloned())
    }

    async fn sample(&self, name: &str) -> StoreResult<Option<Sample>> {
        Ok(self.records.read().samples.get(name).cloned())
    }

    async fn flag_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.records.read().flags.keys().cloned().collect())
    }

    async fn switches(&self) -> StoreResult<Vec<Switch>> {
        Ok(self.records.read().switches.values().cloned().collect())
    }

    async fn sample_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.records.read().samples.keys().cloned().collect())
    }
}
