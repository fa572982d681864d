//! Feature flippers for waff.
//!
//! Three kinds of toggle:
//!
//! - **Flags** target users by role, language, explicit membership or a
//!   sticky random percentage, with query-string overrides for testing
//! - **Switches** are plain on/off toggles
//! - **Samples** are independent random draws
//!
//! Records live in a [`FlagStore`] and are read through a shared
//! [`CacheStore`](waff_cache::CacheStore). Flags can alternatively be
//! resolved from ALPHA/BETA/ALL environment buckets.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use waff_cache::InMemoryCache;
//! use waff_config::WaffSettings;
//! use waff_core::{HttpRequest, HttpResponse, User};
//! use waff_features::*;
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryFlagStore::new();
//! store.insert_flag(Flag::new("new_checkout").with_staff(true));
//! store.insert_switch(Switch::new("maintenance", false));
//!
//! let settings = Arc::new(WaffSettings { use_env_vars: false, ..WaffSettings::default() });
//! let waffle = Waffle::new(Arc::new(store), Arc::new(InMemoryCache::new()), settings.clone());
//!
//! let mut request = HttpRequest::new("GET", "/").with_user(User::new(1, "ann").staff());
//! assert!(waffle.flag_is_active(&mut request, "new_checkout").await);
//! assert!(!waffle.switch_is_active("maintenance").await);
//!
//! // Persist percentage decisions on the way out
//! let response = WaffleMiddleware::new(settings).process_response(&request, HttpResponse::ok());
//! assert!(response.cookies.is_empty());
//! # });
//! ```
//!
//! # Gates
//!
//! ```
//! use waff_features::{FlagGate, SwitchGate};
//!
//! let beta_only = FlagGate::new("beta").redirect_to("/waitlist");
//! let unless_maintenance = SwitchGate::new("!maintenance");
//! ```

pub mod env;
pub mod error;
pub mod gate;
mod hooks;
pub mod keys;
pub mod middleware;
pub mod models;
pub mod rollout;
pub mod snapshot;
pub mod store;
pub mod waffle;

pub use env::flag_is_active_from_env;
pub use error::{StoreError, StoreResult, WaffleError, WaffleResult};
pub use gate::{FlagGate, Gate, SwitchGate, gated};
pub use keys::CacheKeys;
pub use middleware::WaffleMiddleware;
pub use models::{CachedSwitch, Flag, Sample, Switch};
pub use snapshot::WaffleSnapshot;
pub use store::{FlagStore, InMemoryFlagStore};
pub use waffle::{FlagEvaluation, FlagReason, Waffle};
