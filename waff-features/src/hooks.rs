//! Cache population and invalidation.
//!
//! The `cache_*` hooks only add missing entries and never overwrite. Call
//! the matching `uncache_*` hook whenever a record is saved or deleted,
//! or its users or groups change.

use crate::error::WaffleResult;
use crate::models::{CachedSwitch, Flag, Sample};
use crate::waffle::Waffle;
use waff_log::debug;

impl Waffle {
    /// Cache a flag along with its user and group ids.
    pub async fn cache_flag(&self, flag: &Flag) -> WaffleResult<()> {
        let keys = self.keys();
        let users = self.store().flag_users(&flag.name).await?;
        let groups = self.store().flag_groups(&flag.name).await?;

        waff_cache::add(self.cache(), &keys.flag(&flag.name), flag, None).await?;
        waff_cache::add(self.cache(), &keys.flag_users(&flag.name), &users, None).await?;
        waff_cache::add(self.cache(), &keys.flag_groups(&flag.name), &groups, None).await?;
        Ok(())
    }

    pub async fn cache_switch(&self, record: &CachedSwitch) -> WaffleResult<()> {
        waff_cache::add(self.cache(), &self.keys().switch(record.name()), record, None).await?;
        Ok(())
    }

    pub async fn cache_sample(&self, sample: &Sample) -> WaffleResult<()> {
        waff_cache::add(self.cache(), &self.keys().sample(&sample.name), sample, None).await?;
        Ok(())
    }

    pub async fn uncache_flag(&self, name: &str) -> WaffleResult<()> {
        let keys = self.keys();
        self.cache()
            .delete_many(&[
                keys.flag(name).as_str(),
                keys.flag_users(name).as_str(),
                keys.flag_groups(name).as_str(),
                keys.all_flags().as_str(),
            ])
            .await?;
        debug!("uncached flag {}", name);
        Ok(())
    }

    pub async fn uncache_switch(&self, name: &str) -> WaffleResult<()> {
        let keys = self.keys();
        self.cache()
            .delete_many(&[keys.switch(name).as_str(), keys.all_switches().as_str()])
            .await?;
        debug!("uncached switch {}", name);
        Ok(())
    }

    pub async fn uncache_sample(&self, name: &str) -> WaffleResult<()> {
        let keys = self.keys();
        self.cache()
            .delete_many(&[keys.sample(name).as_str(), keys.all_samples().as_str()])
            .await?;
        debug!("uncached sample {}", name);
        Ok(())
    }
}
