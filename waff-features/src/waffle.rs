//! The flag evaluator.

use crate::env::flag_is_active_from_env;
use crate::error::{WaffleError, WaffleResult};
use crate::keys::CacheKeys;
use crate::middleware::WaffleMiddleware;
use crate::models::{CachedSwitch, Flag, Sample};
use crate::rollout;
use crate::store::FlagStore;
use serde::Serialize;
use std::sync::Arc;
use waff_cache::CacheStore;
use waff_config::{EnvBuckets, WaffSettings};
use waff_core::{GroupId, HttpRequest, UserId};
use waff_log::{debug, warn};

/// The rule that decided a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    /// No such flag; the configured default applied
    Unknown,
    Override,
    Everyone,
    Testing,
    Authenticated,
    Staff,
    Superuser,
    Language,
    User,
    Group,
    Percent,
    /// Nothing matched
    NoMatch,
}

/// Outcome of a single flag check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagEvaluation {
    pub active: bool,
    pub reason: FlagReason,
}

impl FlagEvaluation {
    fn new(active: bool, reason: FlagReason) -> Self {
        Self { active, reason }
    }
}

/// Evaluates flags, switches and samples against a store behind a
/// read-through cache.
///
/// Cloning is cheap; every clone shares the same store, cache and
/// settings.
///
/// ```
/// use std::sync::Arc;
/// use waff_cache::InMemoryCache;
/// use waff_config::WaffSettings;
/// use waff_core::HttpRequest;
/// use waff_features::{Flag, InMemoryFlagStore, Waffle};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryFlagStore::new();
/// store.insert_flag(Flag::new("search").with_everyone(Some(true)));
///
/// let settings = WaffSettings { use_env_vars: false, ..WaffSettings::default() };
/// let waffle = Waffle::new(Arc::new(store), Arc::new(InMemoryCache::new()), Arc::new(settings));
///
/// let mut request = HttpRequest::new("GET", "/");
/// assert!(waffle.flag_is_active(&mut request, "search").await);
/// # });
/// ```
#[derive(Clone)]
pub struct Waffle {
    store: Arc<dyn FlagStore>,
    cache: Arc<dyn CacheStore>,
    settings: Arc<WaffSettings>,
    buckets: Arc<EnvBuckets>,
    keys: CacheKeys,
}

impl Waffle {
    pub fn new(
        store: Arc<dyn FlagStore>,
        cache: Arc<dyn CacheStore>,
        settings: Arc<WaffSettings>,
    ) -> Self {
        Self {
            store,
            cache,
            keys: CacheKeys::new(settings.clone()),
            settings,
            buckets: Arc::new(EnvBuckets::default()),
        }
    }

    /// Build with settings and buckets read from `WAFF_*` variables.
    pub fn from_env(
        store: Arc<dyn FlagStore>,
        cache: Arc<dyn CacheStore>,
    ) -> waff_config::Result<Self> {
        let settings = WaffSettings::from_env()?;
        Ok(Self::new(store, cache, Arc::new(settings)).with_buckets(EnvBuckets::from_env()))
    }

    pub fn with_buckets(mut self, buckets: EnvBuckets) -> Self {
        self.buckets = Arc::new(buckets);
        self
    }

    pub fn settings(&self) -> &WaffSettings {
        &self.settings
    }

    pub fn buckets(&self) -> &EnvBuckets {
        &self.buckets
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    /// A response middleware sharing these settings.
    pub fn middleware(&self) -> WaffleMiddleware {
        WaffleMiddleware::new(self.settings.clone())
    }

    pub(crate) fn store(&self) -> &dyn FlagStore {
        self.store.as_ref()
    }

    pub(crate) fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    /// Check a flag through the environment buckets or the store,
    /// depending on `use_env_vars`.
    pub async fn flag_is_active(&self, request: &mut HttpRequest, name: &str) -> bool {
        if self.settings.use_env_vars {
            self.flag_is_active_from_env(request, name)
        } else {
            self.flag_is_active_from_database(request, name).await
        }
    }

    pub fn flag_is_active_from_env(&self, request: &HttpRequest, name: &str) -> bool {
        let active = flag_is_active_from_env(&self.buckets, request, name);
        debug!("flag {} is {} from env buckets", name, on_off(active));
        active
    }

    /// Check a flag against the store. Backend failures resolve to
    /// `flag_default`.
    pub async fn flag_is_active_from_database(&self, request: &mut HttpRequest, name: &str) -> bool {
        match self.try_flag_is_active_from_database(request, name).await {
            Ok(active) => active,
            Err(e) => {
                warn!("flag {} falling back to default: {}", name, e);
                self.settings.flag_default
            }
        }
    }

    pub async fn try_flag_is_active_from_database(
        &self,
        request: &mut HttpRequest,
        name: &str,
    ) -> WaffleResult<bool> {
        Ok(self.explain_flag(request, name).await?.active)
    }

    /// Evaluate a flag against the store and report the deciding rule.
    ///
    /// Rules are tried in order and the first match wins: query override,
    /// `everyone`, testing mode, role gates, language, explicit users,
    /// explicit groups, then the percentage rollout. Testing and percentage
    /// decisions are recorded on `request.waffle`.
    pub async fn explain_flag(
        &self,
        request: &mut HttpRequest,
        name: &str,
    ) -> WaffleResult<FlagEvaluation> {
        let evaluation = self.evaluate_flag(request, name).await?;
        debug!(
            "flag {} is {} ({:?})",
            name,
            on_off(evaluation.active),
            evaluation.reason
        );
        Ok(evaluation)
    }

    async fn evaluate_flag(
        &self,
        request: &mut HttpRequest,
        name: &str,
    ) -> WaffleResult<FlagEvaluation> {
        use FlagReason::*;

        let Some(flag) = self.load_flag(name).await? else {
            return Ok(FlagEvaluation::new(self.settings.flag_default, Unknown));
        };

        if self.settings.override_enabled
            && let Some(value) = request.query(name)
        {
            return Ok(FlagEvaluation::new(value == "1", Override));
        }

        if let Some(everyone) = flag.everyone {
            return Ok(FlagEvaluation::new(everyone, Everyone));
        }

        if flag.testing {
            let test_cookie = self.settings.test_cookie_name(name);
            if let Some(active) = request.query(&test_cookie).map(|v| v == "1") {
                request.waffle.set_test(name, active);
                return Ok(FlagEvaluation::new(active, Testing));
            }
            if let Some(active) = request.cookie(&test_cookie).map(|v| v == "True") {
                return Ok(FlagEvaluation::new(active, Testing));
            }
        }

        let user = request.effective_user();

        if flag.authenticated && user.is_authenticated {
            return Ok(FlagEvaluation::new(true, Authenticated));
        }
        if flag.staff && user.is_staff {
            return Ok(FlagEvaluation::new(true, Staff));
        }
        if flag.superusers && user.is_superuser {
            return Ok(FlagEvaluation::new(true, Superuser));
        }

        if let Some(code) = request.language_code.as_deref()
            && flag.languages().any(|language| language == code)
        {
            return Ok(FlagEvaluation::new(true, Language));
        }

        let users = self.flag_users(&flag).await?;
        if user.id.is_some_and(|id| users.contains(&id)) {
            return Ok(FlagEvaluation::new(true, User));
        }

        let groups = self.flag_groups(&flag).await?;
        if groups.iter().any(|group| user.in_group(*group)) {
            return Ok(FlagEvaluation::new(true, Group));
        }

        if let Some(percent) = flag.rollout_percent() {
            if let Some(decision) = request.waffle.decision(name) {
                return Ok(FlagEvaluation::new(decision.active, Percent));
            }

            let cookie = self.settings.flag_cookie(name);
            let active = match request.cookie(&cookie) {
                Some(value) => value == "True",
                None => rollout::draw(percent),
            };
            request.waffle.set_flag(name, active, flag.rollout);
            return Ok(FlagEvaluation::new(active, Percent));
        }

        Ok(FlagEvaluation::new(false, NoMatch))
    }

    /// Check a switch. A switch missing from the store is cached as
    /// missing and resolves to `switch_default`.
    pub async fn switch_is_active(&self, name: &str) -> bool {
        match self.try_switch_is_active(name).await {
            Ok(active) => active,
            Err(e) => {
                warn!("switch {} falling back to default: {}", name, e);
                self.settings.switch_default
            }
        }
    }

    pub async fn try_switch_is_active(&self, name: &str) -> WaffleResult<bool> {
        let record = self.load_switch(name).await?;
        let active = record.is_active(self.settings.switch_default);
        debug!("switch {} is {}", name, on_off(active));
        Ok(active)
    }

    /// Check a sample. Every call is a fresh draw.
    pub async fn sample_is_active(&self, name: &str) -> bool {
        match self.try_sample_is_active(name).await {
            Ok(active) => active,
            Err(e) => {
                warn!("sample {} falling back to default: {}", name, e);
                self.settings.sample_default
            }
        }
    }

    pub async fn try_sample_is_active(&self, name: &str) -> WaffleResult<bool> {
        let Some(sample) = self.load_sample(name).await? else {
            return Ok(self.settings.sample_default);
        };
        Ok(rollout::draw(sample.percent))
    }

    async fn load_flag(&self, name: &str) -> WaffleResult<Option<Flag>> {
        if let Some(flag) = waff_cache::get_or_evict(self.cache(), &self.keys.flag(name)).await? {
            return Ok(Some(flag));
        }

        match self.store.flag(name).await? {
            Some(flag) => {
                self.cache_flag(&flag).await?;
                Ok(Some(flag))
            }
            None => Ok(None),
        }
    }

    pub(crate) async fn flag_users(&self, flag: &Flag) -> WaffleResult<Vec<UserId>> {
        let key = self.keys.flag_users(&flag.name);
        waff_cache::remember(self.cache(), &key, None, || async {
            Ok::<_, WaffleError>(self.store.flag_users(&flag.name).await?)
        })
        .await
    }

    pub(crate) async fn flag_groups(&self, flag: &Flag) -> WaffleResult<Vec<GroupId>> {
        let key = self.keys.flag_groups(&flag.name);
        waff_cache::remember(self.cache(), &key, None, || async {
            Ok::<_, WaffleError>(self.store.flag_groups(&flag.name).await?)
        })
        .await
    }

    /// Missing switches are cached as [`CachedSwitch::Missing`].
    pub(crate) async fn load_switch(&self, name: &str) -> WaffleResult<CachedSwitch> {
        waff_cache::remember(self.cache(), &self.keys.switch(name), None, || async {
            let record = match self.store.switch(name).await? {
                Some(switch) => CachedSwitch::Found(switch),
                None => CachedSwitch::Missing {
                    name: name.to_string(),
                },
            };
            Ok::<_, WaffleError>(record)
        })
        .await
    }

    async fn load_sample(&self, name: &str) -> WaffleResult<Option<Sample>> {
        waff_cache::remember_found(self.cache(), &self.keys.sample(name), None, || async {
            Ok::<_, WaffleError>(self.store.sample(name).await?)
        })
        .await
    }
}

fn on_off(active: bool) -> &'static str {
    if active { "on" } else { "off" }
}
