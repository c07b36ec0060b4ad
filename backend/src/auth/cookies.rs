//! Cookie names and builders for the credential transport.
//!
//! All authoritative cookies are HttpOnly. The `LOGIN_USER_ID` cookie only
//! carries the cleartext login id for client-side display and is never used
//! for verification.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie carrying the signed access token.
pub const ACCESS_COOKIE: &str = "LOGIN_TOKEN";
/// Duplicate of the access token under a bearer-style name, set on refresh
/// only. Two independent client consumption patterns depend on it, so both
/// cookies are kept.
pub const AUTHORIZATION_COOKIE: &str = "Authorization";
/// Cookie carrying the signed refresh token.
pub const REFRESH_COOKIE: &str = "REFRESH_LOGIN_TOKEN";
/// Cookie carrying the cleartext login id.
pub const LOGIN_USER_ID_COOKIE: &str = "LOGIN_USER_ID";

fn auth_cookie(name: &'static str, value: String, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::seconds(max_age_secs as i64))
        .build()
}

/// Access-token cookie set on login and refresh.
pub fn access_cookie(token: &str, max_age_secs: u64) -> Cookie<'static> {
    auth_cookie(ACCESS_COOKIE, token.to_string(), max_age_secs)
}

/// Bearer-style duplicate of the access token, set on refresh responses.
pub fn authorization_cookie(token: &str, max_age_secs: u64) -> Cookie<'static> {
    auth_cookie(AUTHORIZATION_COOKIE, token.to_string(), max_age_secs)
}

/// Refresh-token cookie set on login.
pub fn refresh_cookie(token: &str, max_age_secs: u64) -> Cookie<'static> {
    auth_cookie(REFRESH_COOKIE, token.to_string(), max_age_secs)
}

/// Display-only cookie with the login id, expiring with the refresh token.
pub fn login_user_id_cookie(user_id: &str, max_age_secs: u64) -> Cookie<'static> {
    auth_cookie(LOGIN_USER_ID_COOKIE, user_id.to_string(), max_age_secs)
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, String::new()))
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// The full clearing set sent on logout, one per cookie name in use.
pub fn logout_cookies() -> [Cookie<'static>; 4] {
    [
        expired(ACCESS_COOKIE),
        expired(AUTHORIZATION_COOKIE),
        expired(REFRESH_COOKIE),
        expired(LOGIN_USER_ID_COOKIE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookies_are_http_only() {
        let cookie = access_cookie("token", 3600);
        assert_eq!(cookie.name(), "LOGIN_TOKEN");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
    }

    #[test]
    fn login_user_id_cookie_carries_cleartext_id() {
        let cookie = login_user_id_cookie("tbell123", 600);
        assert_eq!(cookie.name(), "LOGIN_USER_ID");
        assert_eq!(cookie.value(), "tbell123");
    }

    #[test]
    fn logout_set_expires_every_cookie_name() {
        let cookies = logout_cookies();
        let names: Vec<&str> = cookies.iter().map(|c| c.name()).collect();

        assert_eq!(
            names,
            vec![
                "LOGIN_TOKEN",
                "Authorization",
                "REFRESH_LOGIN_TOKEN",
                "LOGIN_USER_ID"
            ]
        );
        for cookie in &cookies {
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(cookie.value(), "");
        }
    }
}
