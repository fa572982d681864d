//! Gating handlers on flags and switches.
//!
//! A gate name prefixed with `!` passes when the flag or switch is
//! inactive. A failing gate answers with a redirect when one is configured,
//! otherwise 404.

use crate::waffle::Waffle;
use async_trait::async_trait;
use waff_core::{HttpRequest, HttpResponse};
use waff_log::debug;

/// Decides whether a request may reach its handler.
#[async_trait]
pub trait Gate: Send + Sync {
    /// `Err` carries the response to send instead of running the handler.
    async fn check(&self, waffle: &Waffle, request: &mut HttpRequest) -> Result<(), HttpResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    name: String,
    negate: bool,
    redirect_to: Option<String>,
}

impl Condition {
    fn parse(pattern: &str) -> Self {
        let (name, negate) = match pattern.strip_prefix('!') {
            Some(name) => (name, true),
            None => (pattern, false),
        };
        Self {
            name: name.to_string(),
            negate,
            redirect_to: None,
        }
    }

    fn resolve(&self, active: bool) -> Result<(), HttpResponse> {
        if active != self.negate {
            return Ok(());
        }
        debug!("gate on {} closed", self.name);
        Err(match &self.redirect_to {
            Some(location) => HttpResponse::redirect(location.clone()),
            None => HttpResponse::not_found(),
        })
    }
}

/// Gate on a flag; `FlagGate::new("!beta")` only lets non-beta users through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagGate {
    condition: Condition,
}

impl FlagGate {
    pub fn new(pattern: &str) -> Self {
        Self {
            condition: Condition::parse(pattern),
        }
    }

    pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
        self.condition.redirect_to = Some(location.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.condition.name
    }

    pub fn is_negated(&self) -> bool {
        self.condition.negate
    }
}

#[async_trait]
impl Gate for FlagGate {
    async fn check(&self, waffle: &Waffle, request: &mut HttpRequest) -> Result<(), HttpResponse> {
        let active = waffle.flag_is_active(request, &self.condition.name).await;
        self.condition.resolve(active)
    }
}

/// Gate on a switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchGate {
    condition: Condition,
}

impl SwitchGate {
    pub fn new(pattern: &str) -> Self {
        Self {
            condition: Condition::parse(pattern),
        }
    }

    pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
        self.condition.redirect_to = Some(location.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.condition.name
    }

    pub fn is_negated(&self) -> bool {
        self.condition.negate
    }
}

#[async_trait]
impl Gate for SwitchGate {
    async fn check(&self, waffle: &Waffle, _request: &mut HttpRequest) -> Result<(), HttpResponse> {
        let active = waffle.switch_is_active(&self.condition.name).await;
        self.condition.resolve(active)
    }
}

/// Run `view` when `gate` passes, otherwise return the gate's response.
pub async fn gated<G, F>(gate: &G, waffle: &Waffle, request: &mut HttpRequest, view: F) -> HttpResponse
where
    G: Gate + ?Sized,
    F: FnOnce(&mut HttpRequest) -> HttpResponse,
{
    match gate.check(waffle, request).await {
        Ok(()) => view(request),
        Err(response) => response,
    }
}
