//! Per-request flag state.
//!
//! Decisions recorded here are written back to the client as cookies by the
//! response step, so repeated checks within one request stay consistent.

use std::collections::BTreeMap;

/// A percentage decision remembered for the rest of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDecision {
    pub active: bool,
    /// Rollout mode: an inactive decision only lasts for the browser session
    pub session_only: bool,
}

/// Typed flag state attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaffleState {
    decisions: BTreeMap<String, FlagDecision>,
    tests: BTreeMap<String, bool>,
}

impl WaffleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a percentage decision for `flag`.
    pub fn set_flag(&mut self, flag: impl Into<String>, active: bool, session_only: bool) {
        self.decisions.insert(
            flag.into(),
            FlagDecision {
                active,
                session_only,
            },
        );
    }

    pub fn decision(&self, flag: &str) -> Option<FlagDecision> {
        self.decisions.get(flag).copied()
    }

    /// Record a testing-mode override taken from the query string.
    pub fn set_test(&mut self, flag: impl Into<String>, active: bool) {
        self.tests.insert(flag.into(), active);
    }

    pub fn test(&self, flag: &str) -> Option<bool> {
        self.tests.get(flag).copied()
    }

    pub fn decisions(&self) -> impl Iterator<Item = (&str, FlagDecision)> {
        self.decisions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn tests(&self) -> impl Iterator<Item = (&str, bool)> {
        self.tests.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty() && self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decisions_overwrite() {
        let mut state = WaffleState::new();
        assert!(state.is_empty());

        state.set_flag("foo", true, false);
        state.set_flag("foo", false, true);

        assert_eq!(
            state.decision("foo"),
            Some(FlagDecision {
                active: false,
                session_only: true
            })
        );
        assert_eq!(state.decisions().count(), 1);
    }

    #[test]
    fn test_tests_are_separate_from_decisions() {
        let mut state = WaffleState::new();
        state.set_test("foo", true);

        assert_eq!(state.test("foo"), Some(true));
        assert_eq!(state.decision("foo"), None);
        assert!(!state.is_empty());
    }
}
