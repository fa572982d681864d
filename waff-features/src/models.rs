//! Flag, switch and sample records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flag targets users by role, language, explicit membership or a
/// random percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,

    /// `Some(true)` turns the flag on for everyone, `Some(false)` off for
    /// everyone. `None` defers to the other criteria.
    pub everyone: Option<bool>,

    /// Percentage of users to activate for, from 0 to 100
    pub percent: Option<f64>,

    /// Allow `?dwft_<name>=1|0` to set the flag for a session
    pub testing: bool,

    pub superusers: bool,
    pub staff: bool,
    pub authenticated: bool,

    /// Comma-separated language codes
    pub languages: String,

    /// Inactive percentage decisions last only for the browser session
    pub rollout: bool,

    pub note: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Flag {
    /// A flag with nothing switched on except the superuser gate.
    ///
    /// ```
    /// use waff_features::Flag;
    ///
    /// let flag = Flag::new("checkout_v2").with_percent(25.0).with_languages("en,de");
    /// assert_eq!(flag.languages().collect::<Vec<_>>(), vec!["en", "de"]);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            everyone: None,
            percent: None,
            testing: false,
            superusers: true,
            staff: false,
            authenticated: false,
            languages: String::new(),
            rollout: false,
            note: String::new(),
            created: now,
            modified: now,
        }
    }

    pub fn with_everyone(mut self, everyone: Option<bool>) -> Self {
        self.everyone = everyone;
        self
    }

    pub fn with_percent(mut self, percent: f64) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    pub fn with_superusers(mut self, superusers: bool) -> Self {
        self.superusers = superusers;
        self
    }

    pub fn with_staff(mut self, staff: bool) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    pub fn with_rollout(mut self, rollout: bool) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Language codes, trimmed, empty entries skipped.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// Percentage when set and above zero.
    pub fn rollout_percent(&self) -> Option<f64> {
        self.percent.filter(|percent| *percent > 0.0)
    }
}

/// A named on/off toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub name: String,
    pub active: bool,
    pub note: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Switch {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            active,
            note: String::new(),
            created: now,
            modified: now,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// A random draw evaluated independently on every check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    /// Chance of being active, from 0 to 100
    pub percent: f64,
    pub note: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Sample {
    pub fn new(name: impl Into<String>, percent: f64) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            percent,
            note: String::new(),
            created: now,
            modified: now,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// What the cache holds for a switch name.
///
/// A switch that does not exist is cached as `Missing` so repeated checks
/// do not go back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CachedSwitch {
    Found(Switch),
    Missing { name: String },
}

impl CachedSwitch {
    pub fn name(&self) -> &str {
        match self {
            Self::Found(switch) => &switch.name,
            Self::Missing { name } => name,
        }
    }

    /// The stored state, or `default` for a missing switch.
    pub fn is_active(&self, default: bool) -> bool {
        match self {
            Self::Found(switch) => switch.active,
            Self::Missing { .. } => default,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

impl From<Switch> for CachedSwitch {
    fn from(switch: Switch) -> Self {
        Self::Found(switch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults() {
        let flag = Flag::new("foo");
        assert_eq!(flag.everyone, None);
        assert!(flag.superusers);
        assert!(!flag.staff);
        assert!(!flag.authenticated);
        assert!(flag.rollout_percent().is_none());
    }

    #[test]
    fn test_languages_are_trimmed() {
        let flag = Flag::new("foo").with_languages(" en , pt-br,,de ");
        assert_eq!(flag.languages().collect::<Vec<_>>(), vec!["en", "pt-br", "de"]);
        assert_eq!(Flag::new("bar").languages().count(), 0);
    }

    #[test]
    fn test_zero_percent_is_not_a_rollout() {
        assert!(Flag::new("foo").with_percent(0.0).rollout_percent().is_none());
        assert_eq!(Flag::new("foo").with_percent(12.5).rollout_percent(), Some(12.5));
    }

    #[test]
    fn test_cached_switch_resolution() {
        let found = CachedSwitch::from(Switch::new("maintenance", true));
        assert!(found.is_active(false));
        assert_eq!(found.name(), "maintenance");

        let missing = CachedSwitch::Missing {
            name: "ghost".to_string(),
        };
        assert!(missing.is_missing());
        assert!(missing.is_active(true));
        assert!(!missing.is_active(false));
    }

    #[test]
    fn test_cached_switch_serialization() {
        let missing = CachedSwitch::Missing {
            name: "ghost".to_string(),
        };
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["state"], "missing");
        let back: CachedSwitch = serde_json::from_value(json).unwrap();
        assert_eq!(back, missing);
    }
}
