//! Every known flag, switch and sample evaluated for one request.
//!
//! Front-end code consumes this as JSON to mirror server-side checks.

use crate::error::{WaffleError, WaffleResult};
use crate::waffle::Waffle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use waff_core::{HttpRequest, HttpResponse};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaffleSnapshot {
    pub flags: BTreeMap<String, bool>,
    pub switches: BTreeMap<String, bool>,
    pub samples: BTreeMap<String, bool>,
    pub flag_default: bool,
    pub switch_default: bool,
    pub sample_default: bool,
}

impl Waffle {
    /// Evaluate everything for `request`.
    ///
    /// In env mode the names come from the buckets and listed switches and
    /// samples are on. Otherwise names are read through the listing cache
    /// keys and each entry is evaluated like a single check.
    pub async fn snapshot(&self, request: &mut HttpRequest) -> WaffleResult<WaffleSnapshot> {
        let settings = self.settings();
        let mut snapshot = WaffleSnapshot {
            flag_default: settings.flag_default,
            switch_default: settings.switch_default,
            sample_default: settings.sample_default,
            ..WaffleSnapshot::default()
        };

        if settings.use_env_vars {
            let buckets = self.buckets();
            for name in buckets.flag_names() {
                let active = self.flag_is_active_from_env(request, &name);
                snapshot.flags.insert(name, active);
            }
            for name in &buckets.switches {
                snapshot.switches.insert(name.clone(), true);
            }
            for name in &buckets.samples {
                snapshot.samples.insert(name.clone(), true);
            }
            return Ok(snapshot);
        }

        for name in self.all_flag_names().await? {
            let active = self.flag_is_active_from_database(request, &name).await;
            snapshot.flags.insert(name, active);
        }
        for (name, active) in self.all_switch_states().await? {
            snapshot.switches.insert(name, active);
        }
        for name in self.all_sample_names().await? {
            let active = self.sample_is_active(&name).await;
            snapshot.samples.insert(name, active);
        }
        Ok(snapshot)
    }

    /// The snapshot as a JSON response.
    pub async fn snapshot_response(&self, request: &mut HttpRequest) -> WaffleResult<HttpResponse> {
        let snapshot = self.snapshot(request).await?;
        Ok(HttpResponse::ok().with_json(&snapshot)?)
    }

    async fn all_flag_names(&self) -> WaffleResult<Vec<String>> {
        waff_cache::remember(self.cache(), &self.keys().all_flags(), None, || async {
            Ok::<_, WaffleError>(self.store().flag_names().await?)
        })
        .await
    }

    async fn all_switch_states(&self) -> WaffleResult<Vec<(String, bool)>> {
        waff_cache::remember(self.cache(), &self.keys().all_switches(), None, || async {
            let states: Vec<(String, bool)> = self
                .store()
                .switches()
                .await?
                .into_iter()
                .map(|switch| (switch.name, switch.active))
                .collect();
            Ok::<_, WaffleError>(states)
        })
        .await
    }

    async fn all_sample_names(&self) -> WaffleResult<Vec<String>> {
        waff_cache::remember(self.cache(), &self.keys().all_samples(), None, || async {
            Ok::<_, WaffleError>(self.store().sample_names().await?)
        })
        .await
    }
}
