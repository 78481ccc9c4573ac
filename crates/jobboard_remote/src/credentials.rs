//! Credential plumbing shared by every request.
//!
//! The backend authenticates with a bearer token when one exists and guards
//! unsafe methods with Django's CSRF check, which wants the `csrftoken`
//! cookie echoed back in the `X-CSRFToken` header.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use reqwest::{RequestBuilder, Response};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const SESSION_COOKIE: &str = "sessionid";
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub csrf_token: Option<String>,
    pub session_cookie: Option<String>,
}

impl Credentials {
    /// Picks the CSRF token and session id out of a `Cookie`-style header.
    pub fn from_cookie_header(cookies: &str) -> Self {
        Self {
            access_token: None,
            csrf_token: cookie_value(cookies, CSRF_COOKIE),
            session_cookie: cookie_value(cookies, SESSION_COOKIE),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.csrf_token.is_none() && self.session_cookie.is_none()
    }

    pub fn cookie_header(&self) -> Option<String> {
        let pairs: Vec<String> = [
            (CSRF_COOKIE, self.csrf_token.as_deref()),
            (SESSION_COOKIE, self.session_cookie.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| format!("{name}={value}")))
        .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// Reads one cookie out of `name=value; name2=value2`.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Cheaply cloneable handle onto the live credentials of one session.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credentials>>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credentials)),
        }
    }

    pub fn snapshot(&self) -> Credentials {
        self.read().clone()
    }

    pub fn replace(&self, credentials: Credentials) {
        *self.write() = credentials;
    }

    pub fn clear(&self) {
        *self.write() = Credentials::default();
    }

    /// Merges rotated cookies from raw `Set-Cookie` values under one write
    /// lock. A signed-out store stays empty. Returns whether anything changed.
    pub fn rotate<'a>(&self, set_cookies: impl IntoIterator<Item = &'a str>) -> bool {
        let mut credentials = self.write();
        if credentials.is_empty() {
            return false;
        }
        let mut rotated = false;
        for raw in set_cookies {
            let first = raw.split(';').next().unwrap_or_default();
            if let Some(csrf) = cookie_value(first, CSRF_COOKIE) {
                rotated |= credentials.csrf_token.as_deref() != Some(csrf.as_str());
                credentials.csrf_token = Some(csrf);
            }
            if let Some(session) = cookie_value(first, SESSION_COOKIE) {
                rotated |= credentials.session_cookie.as_deref() != Some(session.as_str());
                credentials.session_cookie = Some(session);
            }
        }
        rotated
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Hook applied to every outgoing request and every response.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: RequestBuilder) -> RequestBuilder;

    fn observe(&self, _response: &Response) {}
}

/// Attaches bearer token, CSRF header and cookies from a [`CredentialStore`],
/// and picks up rotated cookies from `Set-Cookie`.
#[derive(Debug, Clone)]
pub struct CredentialInterceptor {
    store: CredentialStore,
}

impl CredentialInterceptor {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for CredentialInterceptor {
    fn intercept(&self, mut request: RequestBuilder) -> RequestBuilder {
        let credentials = self.store.snapshot();
        if let Some(token) = credentials.access_token.as_deref() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(csrf) = credentials.csrf_token.as_deref() {
            request = request.header(CSRF_HEADER, csrf);
        }
        if let Some(cookies) = credentials.cookie_header() {
            request = request.header(COOKIE, cookies);
        }
        request
    }

    fn observe(&self, response: &Response) {
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok());
        if self.store.rotate(set_cookies) {
            jobboard_logging::board_debug!("credentials rotated by server cookies");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_parsing_finds_named_values() {
        let header = "theme=dark; csrftoken=abc123; sessionid=s-9";
        assert_eq!(cookie_value(header, CSRF_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(cookie_value(header, "missing"), None);

        let credentials = Credentials::from_cookie_header(header);
        assert_eq!(credentials.csrf_token.as_deref(), Some("abc123"));
        assert_eq!(credentials.session_cookie.as_deref(), Some("s-9"));
        assert_eq!(credentials.access_token, None);
    }

    #[test]
    fn cookie_header_round_trips_known_cookies_only() {
        let credentials = Credentials {
            access_token: Some("t".into()),
            csrf_token: Some("c".into()),
            session_cookie: None,
        };
        assert_eq!(credentials.cookie_header().as_deref(), Some("csrftoken=c"));
        assert_eq!(Credentials::default().cookie_header(), None);
    }

    #[test]
    fn store_clones_share_state() {
        let store = CredentialStore::default();
        let other = store.clone();
        store.replace(Credentials::default().with_access_token("tok"));
        assert_eq!(other.snapshot().access_token.as_deref(), Some("tok"));
        other.clear();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn rotation_updates_cookies_of_a_live_session() {
        let store = CredentialStore::new(
            Credentials::from_cookie_header("csrftoken=c; sessionid=s").with_access_token("t"),
        );
        assert!(store.rotate(["csrftoken=c2; Path=/", "theme=dark"]));
        let current = store.snapshot();
        assert_eq!(current.csrf_token.as_deref(), Some("c2"));
        assert_eq!(current.session_cookie.as_deref(), Some("s"));
        assert_eq!(current.access_token.as_deref(), Some("t"));
        assert!(!store.rotate(["csrftoken=c2"]));
    }

    #[test]
    fn rotation_after_clear_leaves_store_signed_out() {
        let store = CredentialStore::new(
            Credentials::from_cookie_header("csrftoken=c; sessionid=s").with_access_token("t"),
        );
        store.clear();
        assert!(!store.rotate(["csrftoken=c2; Path=/", "sessionid=s2"]));
        assert!(store.snapshot().is_empty());
    }
}
