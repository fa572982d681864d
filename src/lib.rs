// waff - feature flippers for Rust web services
//
// Flags, switches and samples read through a shared cache, with an
// alternative ALPHA/BETA/ALL environment bucket mode.

pub use waff_cache;
pub use waff_config;
pub use waff_core;
pub use waff_features;
pub use waff_log;

pub use waff_cache::{CacheConfig, CacheError, CacheResult, CacheStore, InMemoryCache};
pub use waff_config::{ConfigError, EnvBuckets, WaffSettings};
pub use waff_core::{FlagDecision, Group, HttpRequest, HttpResponse, SetCookie, User, WaffleState};
pub use waff_features::*;

#[cfg(feature = "redis")]
pub use waff_cache::RedisCache;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CacheStore,
        EnvBuckets,
        Flag,
        FlagGate,
        FlagStore,
        Gate,
        HttpRequest,
        HttpResponse,
        InMemoryCache,
        InMemoryFlagStore,
        Sample,
        Switch,
        SwitchGate,
        User,
        WaffSettings,
        Waffle,
        WaffleMiddleware,
        WaffleSnapshot,
    };
}
