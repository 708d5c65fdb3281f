//! CSRF token propagation
//!
//! The server sets the token in a cookie; every request echoes it back in a
//! header. Names default to Django's `csrftoken` / `X-CSRFToken`.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// Default cookie carrying the CSRF token
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Default header echoing the CSRF token
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Find a cookie value in a `Cookie` header string (`a=1; b=2`)
#[must_use]
pub fn find_cookie<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value)
}

/// Read the CSRF token the jar would send to `url`
#[must_use]
pub fn csrf_token(jar: &Jar, url: &Url, cookie_name: &str) -> Option<String> {
    let cookies = jar.cookies(url)?;
    let cookies = cookies.to_str().ok()?;
    find_cookie(cookies, cookie_name)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Copy the CSRF token from the jar into the request headers
///
/// Leaves the headers untouched when the cookie is absent or the names are
/// not valid header material.
pub fn apply_csrf_header(
    headers: &mut HeaderMap,
    jar: &Jar,
    url: &Url,
    cookie_name: &str,
    header_name: &str,
) {
    let Some(token) = csrf_token(jar, url, cookie_name) else {
        return;
    };

    let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(header_name.as_bytes()),
        HeaderValue::from_str(&token),
    ) else {
        log::warn!("Ignoring CSRF token that cannot be sent as header '{header_name}'");
        return;
    };

    headers.insert(name, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn test_find_cookie() {
        let header = "sessionid=abc; csrftoken=token123; theme=dark";
        assert_eq!(find_cookie(header, "csrftoken"), Some("token123"));
        assert_eq!(find_cookie(header, "sessionid"), Some("abc"));
        assert_eq!(find_cookie(header, "missing"), None);
        assert_eq!(find_cookie("", "csrftoken"), None);
    }

    #[test]
    fn test_find_cookie_requires_exact_name() {
        let header = "xcsrftoken=nope; csrftoken2=nope";
        assert_eq!(find_cookie(header, "csrftoken"), None);
    }

    #[test]
    fn test_header_set_from_jar() {
        let jar = Jar::default();
        jar.add_cookie_str("csrftoken=secret-token; Path=/", &base_url());

        let mut headers = HeaderMap::new();
        apply_csrf_header(
            &mut headers,
            &jar,
            &base_url().join("/api/auth/register/begin/").unwrap(),
            CSRF_COOKIE_NAME,
            CSRF_HEADER_NAME,
        );

        assert_eq!(headers.get(CSRF_HEADER_NAME).unwrap(), "secret-token");
    }

    #[test]
    fn test_header_absent_without_cookie() {
        let jar = Jar::default();
        jar.add_cookie_str("sessionid=abc; Path=/", &base_url());

        let mut headers = HeaderMap::new();
        apply_csrf_header(&mut headers, &jar, &base_url(), CSRF_COOKIE_NAME, CSRF_HEADER_NAME);

        assert!(headers.get(CSRF_HEADER_NAME).is_none());
    }

    #[test]
    fn test_custom_names() {
        let jar = Jar::default();
        jar.add_cookie_str("XSRF-TOKEN=angular; Path=/", &base_url());

        let mut headers = HeaderMap::new();
        apply_csrf_header(&mut headers, &jar, &base_url(), "XSRF-TOKEN", "X-XSRF-TOKEN");

        assert_eq!(headers.get("X-XSRF-TOKEN").unwrap(), "angular");
    }
}
