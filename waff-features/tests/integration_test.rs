//! Integration tests for waff-features

use std::sync::Arc;
use waff_cache::{CacheStore, InMemoryCache};
use waff_config::{EnvBuckets, WaffSettings};
use waff_core::{HttpRequest, HttpResponse, User};
use waff_features::*;

fn db_settings() -> WaffSettings {
    WaffSettings {
        use_env_vars: false,
        ..WaffSettings::default()
    }
}

fn setup(settings: WaffSettings) -> (InMemoryFlagStore, InMemoryCache, Waffle) {
    let store = InMemoryFlagStore::new();
    let cache = InMemoryCache::new();
    let waffle = Waffle::new(
        Arc::new(store.clone()),
        Arc::new(cache.clone()),
        Arc::new(settings),
    );
    (store, cache, waffle)
}

#[tokio::test]
async fn test_cache_flag_does_not_overwrite() {
    let (store, cache, waffle) = setup(db_settings());
    let flag = Flag::new("foo").with_everyone(Some(true));
    store.insert_flag(flag.clone());

    waffle.cache_flag(&flag).await.unwrap();
    waffle
        .cache_flag(&flag.clone().with_everyone(Some(false)))
        .await
        .unwrap();

    let cached: Option<Flag> = waff_cache::get(&cache, &waffle.keys().flag("foo")).await.unwrap();
    assert_eq!(cached.unwrap().everyone, Some(true));
    assert!(cache.exists(&waffle.keys().flag_users("foo")).await.unwrap());
    assert!(cache.exists(&waffle.keys().flag_groups("foo")).await.unwrap());
}

#[tokio::test]
async fn test_cached_switch_and_sample_hold_until_uncached() {
    let (store, _cache, waffle) = setup(db_settings());
    store.insert_switch(Switch::new("bar", false));
    store.insert_sample(Sample::new("baz", 0.0));

    // Pre-warm with a different state than the store holds
    waffle
        .cache_switch(&CachedSwitch::Found(Switch::new("bar", true)))
        .await
        .unwrap();
    waffle.cache_sample(&Sample::new("baz", 100.0)).await.unwrap();
    assert!(waffle.switch_is_active("bar").await);
    assert!(waffle.sample_is_active("baz").await);

    // Already cached, so add does not replace
    waffle
        .cache_switch(&CachedSwitch::Missing {
            name: "bar".to_string(),
        })
        .await
        .unwrap();
    assert!(waffle.switch_is_active("bar").await);

    waffle.uncache_switch("bar").await.unwrap();
    waffle.uncache_sample("baz").await.unwrap();
    assert!(!waffle.switch_is_active("bar").await);
    assert!(!waffle.sample_is_active("baz").await);
}

#[tokio::test]
async fn test_uncache_drops_listing_keys() {
    let (store, cache, waffle) = setup(db_settings());
    store.insert_flag(Flag::new("foo"));
    store.insert_switch(Switch::new("bar", true));
    store.insert_sample(Sample::new("baz", 100.0));

    waffle.snapshot(&mut HttpRequest::default()).await.unwrap();
    let keys = waffle.keys().clone();
    for key in [keys.all_flags(), keys.all_switches(), keys.all_samples()] {
        assert!(cache.exists(&key).await.unwrap(), "{key} should be cached");
    }

    waffle.uncache_flag("foo").await.unwrap();
    waffle.uncache_switch("bar").await.unwrap();
    waffle.uncache_sample("baz").await.unwrap();

    for key in [
        keys.all_flags(),
        keys.all_switches(),
        keys.all_samples(),
        keys.flag("foo"),
        keys.flag_users("foo"),
        keys.switch("bar"),
        keys.sample("baz"),
    ] {
        assert!(!cache.exists(&key).await.unwrap(), "{key} should be gone");
    }
}

#[tokio::test]
async fn test_snapshot_from_store() {
    let (store, _cache, waffle) = setup(WaffSettings {
        switch_default: true,
        ..db_settings()
    });
    store.insert_flag(Flag::new("on").with_everyone(Some(true)));
    store.insert_flag(Flag::new("staff").with_staff(true));
    store.insert_switch(Switch::new("maintenance", false));
    store.insert_sample(Sample::new("always", 100.0));

    let mut request = HttpRequest::new("GET", "/").with_user(User::new(1, "ann"));
    let snapshot = waffle.snapshot(&mut request).await.unwrap();

    assert_eq!(snapshot.flags.get("on"), Some(&true));
    assert_eq!(snapshot.flags.get("staff"), Some(&false));
    assert_eq!(snapshot.switches.get("maintenance"), Some(&false));
    assert_eq!(snapshot.samples.get("always"), Some(&true));
    assert!(snapshot.switch_default);
    assert!(!snapshot.flag_default);
}

#[tokio::test]
async fn test_snapshot_listing_is_cached() {
    let (store, _cache, waffle) = setup(db_settings());
    store.insert_flag(Flag::new("first"));
    waffle.snapshot(&mut HttpRequest::default()).await.unwrap();

    store.insert_flag(Flag::new("second"));
    let snapshot = waffle.snapshot(&mut HttpRequest::default()).await.unwrap();
    assert!(!snapshot.flags.contains_key("second"));

    waffle.uncache_flag("second").await.unwrap();
    let snapshot = waffle.snapshot(&mut HttpRequest::default()).await.unwrap();
    assert!(snapshot.flags.contains_key("second"));
}

#[tokio::test]
async fn test_snapshot_from_env() {
    let (_store, _cache, waffle) = setup(WaffSettings::default());
    let waffle = waffle.with_buckets(EnvBuckets {
        all_flags: vec!["everyone".to_string()],
        alpha_flags: vec!["early".to_string()],
        alpha_users: vec!["ann".to_string()],
        switches: vec!["dark_mode".to_string()],
        samples: vec!["survey".to_string()],
        ..EnvBuckets::default()
    });

    let mut bob = HttpRequest::new("GET", "/").with_user(User::new(2, "bob"));
    let snapshot = waffle.snapshot(&mut bob).await.unwrap();

    assert_eq!(snapshot.flags.get("everyone"), Some(&true));
    assert_eq!(snapshot.flags.get("early"), Some(&false));
    assert_eq!(snapshot.switches.get("dark_mode"), Some(&true));
    assert_eq!(snapshot.samples.get("survey"), Some(&true));
}

#[tokio::test]
async fn test_snapshot_response_is_json() {
    let (store, _cache, waffle) = setup(db_settings());
    store.insert_flag(Flag::new("on").with_everyone(Some(true)));

    let response = waffle
        .snapshot_response(&mut HttpRequest::default())
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(
        response.headers.get("Content-Type"),
        Some(&"application/json".to_string())
    );

    let snapshot: WaffleSnapshot = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(snapshot.flags.get("on"), Some(&true));
}

#[tokio::test]
async fn test_flag_gate() {
    let (store, _cache, waffle) = setup(db_settings());
    store.insert_flag(Flag::new("beta").with_authenticated(true));

    let view = |_: &mut HttpRequest| HttpResponse::ok().with_text("welcome");

    let gate = FlagGate::new("beta");
    let mut member = HttpRequest::new("GET", "/").with_user(User::new(1, "ann"));
    assert_eq!(gated(&gate, &waffle, &mut member, view).await.status, 200);

    let mut anonymous = HttpRequest::new("GET", "/");
    assert_eq!(gated(&gate, &waffle, &mut anonymous, view).await.status, 404);

    let gate = FlagGate::new("beta").redirect_to("/waitlist");
    let response = gated(&gate, &waffle, &mut anonymous, view).await;
    assert!(response.is_redirect());
    assert_eq!(response.headers.get("Location"), Some(&"/waitlist".to_string()));

    let inverted = FlagGate::new("!beta");
    assert_eq!(gated(&inverted, &waffle, &mut anonymous, view).await.status, 200);
    assert_eq!(gated(&inverted, &waffle, &mut member, view).await.status, 404);
}

#[tokio::test]
async fn test_switch_gate() {
    let (store, _cache, waffle) = setup(db_settings());
    store.insert_switch(Switch::new("maintenance", true));

    let gates: Vec<Box<dyn Gate>> = vec![
        Box::new(SwitchGate::new("maintenance")),
        Box::new(SwitchGate::new("!maintenance").redirect_to("/down")),
    ];

    let mut request = HttpRequest::new("GET", "/");
    assert!(gates[0].check(&waffle, &mut request).await.is_ok());
    let denied = gates[1].check(&waffle, &mut request).await.unwrap_err();
    assert_eq!(denied.status, 302);
}

#[tokio::test]
async fn test_decisions_round_trip_through_cookies() {
    let (store, _cache, waffle) = setup(db_settings());
    store.insert_flag(Flag::new("rollout").with_percent(100.0));
    store.insert_flag(Flag::new("qa").with_testing(true));

    let mut request = HttpRequest::get("/?dwft_qa=1").unwrap();
    assert!(waffle.flag_is_active(&mut request, "rollout").await);
    assert!(waffle.flag_is_active(&mut request, "qa").await);

    let response = waffle
        .middleware()
        .process_response(&request, HttpResponse::ok());
    let rollout = response.cookie("dwf_rollout").unwrap();
    assert_eq!(rollout.value, "True");
    assert_eq!(rollout.max_age, Some(waffle.settings().max_age));
    assert!(response.cookie("dwft_qa").unwrap().is_session());

    // The next request carries the cookies back, next to a bare-name cookie
    let header = response
        .cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .chain(["_ga".to_string()])
        .collect::<Vec<_>>()
        .join("; ");
    store.insert_flag(Flag::new("rollout").with_percent(1.0));
    waffle.uncache_flag("rollout").await.unwrap();

    let mut next = HttpRequest::new("GET", "/")
        .with_cookie_header(&header);
    assert!(waffle.flag_is_active(&mut next, "rollout").await);
    assert!(waffle.flag_is_active(&mut next, "qa").await);
}

#[tokio::test]
async fn test_store_errors_display() {
    let err = WaffleError::from(StoreError::InvalidRecord {
        name: "foo".to_string(),
        reason: "percent above 100".to_string(),
    });
    assert_eq!(err.to_string(), "Invalid record foo: percent above 100");
}
