// HTTP request and response types

use crate::error::{Error, Result};
use crate::state::WaffleState;
use crate::user::User;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// HTTP request as seen by flag evaluation.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    /// Authenticated or anonymous user attached by the host's auth layer
    pub user: Option<User>,
    /// Active locale code, e.g. `en` or `pt-br`
    pub language_code: Option<String>,
    /// Flag decisions made while handling this request
    pub waffle: WaffleState,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Build a GET request from a path that may carry a query string.
    ///
    /// ```
    /// use waff_core::HttpRequest;
    ///
    /// let req = HttpRequest::get("/checkout?dwft_beta=1").unwrap();
    /// assert_eq!(req.path, "/checkout");
    /// assert_eq!(req.query("dwft_beta").map(String::as_str), Some("1"));
    /// ```
    pub fn get(uri: &str) -> Result<Self> {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };
        let mut request = Self::new("GET", path);
        request.query_params = parse_query(query)?;
        Ok(request)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Parse a raw `Cookie` header into the cookie map.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.cookies.extend(parse_cookie_header(header));
        self.headers.insert("Cookie".to_string(), header.to_string());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }

    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    /// The attached user, or the anonymous user when none is attached.
    pub fn effective_user(&self) -> &User {
        self.user.as_ref().unwrap_or(User::anonymous_ref())
    }
}

/// Parse `a=1&b=two` into a map. Later duplicates win.
pub fn parse_query(query: &str) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode(name)?;
        let value = decode(value)?;
        params.insert(name, value);
    }
    Ok(params)
}

/// Parse a `Cookie` request header (`a=1; b=2`).
///
/// Parts without `=` are skipped, so the other cookies in the header survive.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(name, value)| (name.trim(), value.trim().trim_matches('"')))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn decode(raw: &str) -> Result<String> {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .map_err(|e| Error::InvalidQuery(e.to_string()))
}

/// A `Set-Cookie` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    /// `None` makes a session cookie
    pub max_age: Option<u64>,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
}

impl SetCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: "/".to_string(),
            secure: false,
            http_only: false,
        }
    }

    pub fn with_max_age(mut self, max_age: Option<u64>) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn is_session(&self) -> bool {
        self.max_age.is_none()
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        Ok(())
    }
}

/// HTTP response wrapper
#[derive(Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Cookies to emit; one `Set-Cookie` header each
    pub cookies: Vec<SetCookie>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).with_header("Location".to_string(), location.into())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_text(self, body: impl Into<String>) -> Self {
        self.with_header(
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        )
        .with_body(body.into().into_bytes())
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Add a cookie, replacing an earlier one with the same name.
    pub fn set_cookie(&mut self, cookie: SetCookie) {
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<&SetCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Rendered `Set-Cookie` header values.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies.iter().map(ToString::to_string).collect()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}
