//! Response step: persist the decisions recorded during a request.

use std::sync::Arc;
use waff_config::WaffSettings;
use waff_core::{HttpRequest, HttpResponse, SetCookie};
use waff_log::trace;

/// Writes rollout and testing decisions back to the client as cookies.
///
/// ```
/// use std::sync::Arc;
/// use waff_config::WaffSettings;
/// use waff_core::{HttpRequest, HttpResponse};
/// use waff_features::WaffleMiddleware;
///
/// let middleware = WaffleMiddleware::new(Arc::new(WaffSettings::default()));
/// let mut request = HttpRequest::new("GET", "/");
/// request.waffle.set_flag("beta", true, false);
///
/// let response = middleware.process_response(&request, HttpResponse::ok());
/// assert_eq!(response.cookie("dwf_beta").unwrap().value, "True");
/// ```
#[derive(Debug, Clone)]
pub struct WaffleMiddleware {
    settings: Arc<WaffSettings>,
}

impl WaffleMiddleware {
    pub fn new(settings: Arc<WaffSettings>) -> Self {
        Self { settings }
    }

    pub fn process_response(&self, request: &HttpRequest, mut response: HttpResponse) -> HttpResponse {
        let secure = self.settings.secure;

        for (name, decision) in request.waffle.decisions() {
            // Inactive rollout decisions are re-drawn next session.
            let max_age = if decision.session_only && !decision.active {
                None
            } else {
                Some(self.settings.max_age)
            };
            let cookie = SetCookie::new(self.settings.flag_cookie(name), cookie_value(decision.active))
                .with_max_age(max_age)
                .with_secure(secure);
            trace!("setting {}", cookie);
            response.set_cookie(cookie);
        }

        for (name, active) in request.waffle.tests() {
            let cookie =
                SetCookie::new(self.settings.test_cookie_name(name), cookie_value(active))
                    .with_secure(secure);
            trace!("setting {}", cookie);
            response.set_cookie(cookie);
        }

        response
    }
}

fn cookie_value(active: bool) -> &'static str {
    if active { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn middleware(settings: WaffSettings) -> WaffleMiddleware {
        WaffleMiddleware::new(Arc::new(settings))
    }

    #[test]
    fn test_no_decisions_no_cookies() {
        let response =
            middleware(WaffSettings::default()).process_response(&HttpRequest::default(), HttpResponse::ok());
        assert!(response.cookies.is_empty());
    }

    #[test]
    fn test_decision_cookies() {
        let mut request = HttpRequest::new("GET", "/");
        request.waffle.set_flag("on", true, false);
        request.waffle.set_flag("off", false, false);

        let response = middleware(WaffSettings::default()).process_response(&request, HttpResponse::ok());

        let on = response.cookie("dwf_on").unwrap();
        assert_eq!(on.value, "True");
        assert_eq!(on.max_age, Some(2_592_000));
        assert!(on.secure);

        let off = response.cookie("dwf_off").unwrap();
        assert_eq!(off.value, "False");
        assert_eq!(off.max_age, Some(2_592_000));
    }

    #[test]
    fn test_rollout_inactive_is_session_cookie() {
        let mut request = HttpRequest::new("GET", "/");
        request.waffle.set_flag("off", false, true);
        request.waffle.set_flag("on", true, true);

        let response = middleware(WaffSettings::default()).process_response(&request, HttpResponse::ok());

        assert!(response.cookie("dwf_off").unwrap().is_session());
        assert!(!response.cookie("dwf_on").unwrap().is_session());
    }

    #[test]
    fn test_test_cookies_are_session_cookies() {
        let mut request = HttpRequest::new("GET", "/");
        request.waffle.set_test("beta", false);

        let settings = WaffSettings {
            secure: false,
            ..WaffSettings::default()
        };
        let response = middleware(settings).process_response(&request, HttpResponse::ok());

        let cookie = response.cookie("dwft_beta").unwrap();
        assert_eq!(cookie.value, "False");
        assert!(cookie.is_session());
        assert!(!cookie.secure);
        assert_eq!(response.set_cookie_headers(), vec!["dwft_beta=False; Path=/".to_string()]);
    }

    #[test]
    fn test_custom_cookie_templates() {
        let mut request = HttpRequest::new("GET", "/");
        request.waffle.set_flag("beta", true, false);

        let settings = WaffSettings {
            cookie: "ff_%s".to_string(),
            max_age: 60,
            ..WaffSettings::default()
        };
        let response = middleware(settings).process_response(&request, HttpResponse::ok());
        assert_eq!(response.cookie("ff_beta").unwrap().max_age, Some(60));
    }
}
