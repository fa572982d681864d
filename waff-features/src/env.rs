//! Flag resolution from environment buckets.

use waff_config::EnvBuckets;
use waff_core::HttpRequest;

/// Resolve `flag` against the ALPHA, BETA and ALL buckets.
///
/// ALL wins for everyone. Otherwise an authenticated user must be named in
/// the user list of the bucket holding the flag, ALPHA checked first.
pub fn flag_is_active_from_env(buckets: &EnvBuckets, request: &HttpRequest, flag: &str) -> bool {
    if !buckets.has_flags() {
        return false;
    }

    if buckets.is_all_flag(flag) {
        return true;
    }

    if let Some(user) = request.user.as_ref().filter(|u| u.is_authenticated) {
        if buckets.is_alpha_flag(flag) {
            return buckets.is_alpha_user(&user.username);
        }
        if buckets.is_beta_flag(flag) {
            return buckets.is_beta_user(&user.username);
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use waff_config::EnvLoader;
    use waff_core::User;

    fn buckets(vars: &[(&str, &str)]) -> EnvBuckets {
        EnvBuckets::from_env_loader(&EnvLoader::from_map(
            Some("WAFF".to_string()),
            vars.iter().copied(),
        ))
    }

    fn request_for(username: &str) -> HttpRequest {
        HttpRequest::new("GET", "/").with_user(User::new(1, username))
    }

    #[test]
    fn test_nothing_configured() {
        let buckets = buckets(&[]);
        assert!(!flag_is_active_from_env(&buckets, &request_for("ann"), "foo"));
    }

    #[test]
    fn test_all_bucket_is_for_everyone() {
        let buckets = buckets(&[("WAFF_ALL_FLAGS", "foo")]);
        assert!(flag_is_active_from_env(&buckets, &HttpRequest::new("GET", "/"), "foo"));
        assert!(!flag_is_active_from_env(&buckets, &request_for("ann"), "bar"));
    }

    #[test]
    fn test_all_wins_over_alpha() {
        let buckets = buckets(&[
            ("WAFF_ALL_FLAGS", "foo"),
            ("WAFF_ALPHA_FLAGS", "foo"),
            ("WAFF_ALPHA_USERS", "ann"),
        ]);
        assert!(flag_is_active_from_env(&buckets, &request_for("bob"), "foo"));
    }

    #[test]
    fn test_alpha_and_beta_users() {
        let buckets = buckets(&[
            ("WAFF_ALPHA_FLAGS", "foo"),
            ("WAFF_BETA_FLAGS", "bar"),
            ("WAFF_ALPHA_USERS", "ann"),
            ("WAFF_BETA_USERS", "bob, ann"),
        ]);

        assert!(flag_is_active_from_env(&buckets, &request_for("ann"), "foo"));
        assert!(!flag_is_active_from_env(&buckets, &request_for("bob"), "foo"));
        assert!(flag_is_active_from_env(&buckets, &request_for("bob"), "bar"));
        assert!(flag_is_active_from_env(&buckets, &request_for("ann"), "bar"));
    }

    #[test]
    fn test_alpha_checked_before_beta() {
        let buckets = buckets(&[
            ("WAFF_ALPHA_FLAGS", "foo"),
            ("WAFF_BETA_FLAGS", "foo"),
            ("WAFF_BETA_USERS", "bob"),
        ]);
        assert!(!flag_is_active_from_env(&buckets, &request_for("bob"), "foo"));
    }

    #[test]
    fn test_anonymous_users_never_match_buckets() {
        let buckets = buckets(&[("WAFF_ALPHA_FLAGS", "foo"), ("WAFF_ALPHA_USERS", "")]);
        let request = HttpRequest::new("GET", "/").with_user(User::anonymous());
        assert!(!flag_is_active_from_env(&buckets, &request, "foo"));
    }
}
