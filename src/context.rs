use std::sync::Arc;

use tower_cookies::{cookie::SameSite, Cookie, Cookies, Key};

pub const SESSION_COOKIE: &str = "qid";
pub const SESSION_USER_KEY: &str = "userId";

/// Somewhere to keep per-client state between requests.
pub trait SessionStore: Send + Sync {
    fn set(&self, key: &str, value: String);
}

/// Per-request data handed to every resolver next to the schema-wide stores.
#[derive(Clone)]
pub struct RequestContext {
    session: Arc<dyn SessionStore>,
}

impl RequestContext {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }
}

/// Session backed by signed cookies, one cookie per key. `qid` holds the user id.
pub struct CookieSession {
    cookies: Cookies,
    key: Key,
}

impl CookieSession {
    pub fn new(cookies: Cookies, key: Key) -> Self {
        Self { cookies, key }
    }

    fn cookie_name(key: &str) -> String {
        if key == SESSION_USER_KEY {
            SESSION_COOKIE.to_owned()
        } else {
            format!("{SESSION_COOKIE}.{key}")
        }
    }
}

impl SessionStore for CookieSession {
    fn set(&self, key: &str, value: String) {
        let cookie = Cookie::build((Self::cookie_name(key), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        self.cookies.signed(&self.key).add(cookie);
    }
}

/// Derives the cookie signing key. Without a secret every process start gets a
/// fresh key, which logs everyone out on restart.
pub fn session_key(secret: Option<&str>) -> Result<Key, anyhow::Error> {
    match secret {
        Some(secret) if secret.len() >= 64 => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid SESSION_SECRET: {e}")),
        Some(_) => Err(anyhow::anyhow!(
            "SESSION_SECRET must be at least 64 bytes long"
        )),
        None => {
            log::warn!("SESSION_SECRET not set, using a random session key");
            Ok(Key::generate())
        }
    }
}
