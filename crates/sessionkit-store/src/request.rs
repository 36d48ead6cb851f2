//! Read-only view of the inbound request handed to stores.

use cookie::Cookie;
use http::{HeaderMap, Method, Request, Uri, header::COOKIE};

/// The parts of an inbound request a store may look at.
///
/// Captured once when the request enters the session layer; the body is
/// never part of it.
#[derive(Debug, Clone, Default)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestHead {
    /// Create a request head from its parts.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Capture the head of an `http::Request`.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers().clone(),
        )
    }

    /// Raw value of the named cookie, if the client sent one.
    ///
    /// Malformed cookie pairs are skipped. When a name repeats, the first
    /// occurrence wins.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(|parsed| parsed.ok())
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn head_with_cookies(values: &[&str]) -> RequestHead {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(COOKIE, HeaderValue::from_str(value).unwrap());
        }
        RequestHead::new(Method::GET, Uri::from_static("/"), headers)
    }

    #[test]
    fn test_cookie_lookup() {
        let head = head_with_cookies(&["a=1; app=xyz", "other=2"]);
        assert_eq!(head.cookie("app"), Some("xyz".to_string()));
        assert_eq!(head.cookie("other"), Some("2".to_string()));
        assert_eq!(head.cookie("missing"), None);
    }

    #[test]
    fn test_cookie_first_wins() {
        let head = head_with_cookies(&["app=first", "app=second"]);
        assert_eq!(head.cookie("app"), Some("first".to_string()));
    }

    #[test]
    fn test_from_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(COOKIE, "app=v")
            .body(())
            .unwrap();
        let head = RequestHead::from_request(&request);
        assert_eq!(head.method, Method::POST);
        assert_eq!(head.uri.path(), "/login");
        assert_eq!(head.cookie("app"), Some("v".to_string()));
    }
}
