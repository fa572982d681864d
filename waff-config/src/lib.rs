//! Settings for the waff feature flipper.
//!
//! [`WaffSettings`] holds defaults, cookie names and cache key templates;
//! [`EnvBuckets`] holds the ALPHA/BETA/ALL lists used by environment mode.
//! Both are built once at startup and passed by reference.
//!
//! ```
//! use waff_config::{EnvBuckets, EnvLoader, WaffSettings};
//!
//! let env = EnvLoader::from_map(
//!     Some("WAFF".to_string()),
//!     [("WAFF_ALL_FLAGS", "new-footer"), ("WAFF_OVERRIDE", "1")],
//! );
//! let settings = WaffSettings::from_env_loader(&env).unwrap();
//! let buckets = EnvBuckets::from_env_loader(&env);
//!
//! assert!(settings.override_enabled);
//! assert!(buckets.is_all_flag("new-footer"));
//! ```

pub mod buckets;
pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use buckets::EnvBuckets;
pub use env::{EnvLoader, parse_bool, parse_list};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::WaffSettings;
pub use validation::{ConfigValidator, Validate};
