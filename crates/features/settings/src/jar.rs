//! Cookie access for the cookie backend.
//!
//! Handlers pass the request's [`Cookies`]; anything outside a request can use a
//! [`MemoryJar`].

use parking_lot::Mutex;
use std::collections::HashMap;
use tower_cookies::{Cookie, Cookies};

/// The three cookie operations the settings store needs.
pub trait CookieAccess: Send + Sync {
    /// Value of the named cookie, if the client sent one (or it was set earlier in the same
    /// request).
    fn get(&self, name: &str) -> Option<String>;

    fn set(&self, cookie: Cookie<'static>);

    /// Expires the named cookie on the client.
    fn remove(&self, name: &str);
}

impl CookieAccess for Cookies {
    fn get(&self, name: &str) -> Option<String> {
        Self::get(self, name).map(|c| c.value().to_owned())
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.add(cookie);
    }

    fn remove(&self, name: &str) {
        Self::remove(self, Cookie::build((name.to_owned(), "")).path("/").build());
    }
}

/// In-process cookie jar.
#[derive(Debug, Default)]
pub struct MemoryJar {
    cookies: Mutex<HashMap<String, Cookie<'static>>>,
}

impl MemoryJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar holding one cookie, as if the client had sent it.
    #[must_use]
    pub fn with(name: impl Into<String>, value: impl Into<String>) -> Self {
        let jar = Self::new();
        jar.set(Cookie::new(name.into(), value.into()));
        jar
    }

    /// Full cookie, attributes included.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie<'static>> {
        self.cookies.lock().get(name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.lock().len()
    }
}

impl CookieAccess for MemoryJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.lock().get(name).map(|c| c.value().to_owned())
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.cookies.lock().insert(cookie.name().to_owned(), cookie);
    }

    fn remove(&self, name: &str) {
        self.cookies.lock().remove(name);
    }
}
