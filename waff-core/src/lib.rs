//! Core request/response types for waff.
//!
//! The host framework maps its own request into [`HttpRequest`] (user,
//! cookies, query string, locale) and applies the resulting
//! [`HttpResponse`] cookies on the way out.

pub mod error;
pub mod http;
pub mod state;
pub mod user;

pub use error::{Error, Result};
pub use http::{HttpRequest, HttpResponse, SetCookie, parse_cookie_header, parse_query};
pub use state::{FlagDecision, WaffleState};
pub use user::{Group, GroupId, User, UserId};

