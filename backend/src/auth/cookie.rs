//! Refresh-token cookie handling.
//!
//! Login and refresh hand the refresh token back as an `HttpOnly` cookie;
//! refresh and logout read it from the `Cookie` header.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};

use crate::config::Config;

/// How the refresh token is delivered to clients.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    pub name: String,
    pub secure: bool,
    pub max_age_seconds: u64,
    /// Also return the refresh token in the JSON body
    pub include_in_body: bool,
}

impl RefreshCookie {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.refresh_cookie_name.clone(),
            secure: config.refresh_cookie_secure,
            max_age_seconds: config.jwt_refresh_expires_in_seconds,
            include_in_body: config.refresh_token_in_body,
        }
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn create(&self, token: &str) -> String {
        self.render(token, self.max_age_seconds)
    }

    /// `Set-Cookie` value that expires the cookie immediately.
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    /// Response headers setting the cookie, or `None` if the value is not a
    /// valid header.
    pub fn set_headers(&self, token: &str) -> Option<HeaderMap> {
        Self::headers_with(&self.create(token))
    }

    pub fn clear_headers(&self) -> Option<HeaderMap> {
        Self::headers_with(&self.clear())
    }

    /// Extract the refresh token from request cookies.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        let prefix = format!("{}=", self.name);

        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .map(str::trim)
            .find_map(|part| part.strip_prefix(prefix.as_str()))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn render(&self, value: &str, max_age: u64) -> String {
        let secure_flag = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly{}; SameSite=Lax; Path=/; Max-Age={}",
            self.name, value, secure_flag, max_age
        )
    }

    fn headers_with(cookie: &str) -> Option<HeaderMap> {
        let value = HeaderValue::from_str(cookie).ok()?;
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, value);
        Some(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(secure: bool) -> RefreshCookie {
        RefreshCookie {
            name: "token".into(),
            secure,
            max_age_seconds: 600,
            include_in_body: false,
        }
    }

    #[test]
    fn test_create_cookie() {
        assert_eq!(
            cookie(false).create("abc.def"),
            "token=abc.def; HttpOnly; SameSite=Lax; Path=/; Max-Age=600"
        );
        assert_eq!(
            cookie(true).create("abc.def"),
            "token=abc.def; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=600"
        );
        assert!(cookie(false).clear().ends_with("Max-Age=0"));
    }

    #[test]
    fn test_extract_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def ; other=1"),
        );

        assert_eq!(cookie(false).extract(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert!(cookie(false).extract(&headers).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("token=; mytoken=x"));
        assert!(cookie(false).extract(&headers).is_none());
    }
}
