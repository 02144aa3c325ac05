//! Session cookie rendering.
//!
//! The lifecycle core never touches HTTP itself; these helpers render the
//! `Set-Cookie` values the surrounding web layer attaches when a session
//! is issued, renewed or removed. A session's `cross_site` flag switches
//! the `SameSite` attribute and nothing else.

use std::fmt;

use crate::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    Lax,
    #[default]
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::None => f.write_str("None"),
            SameSite::Lax => f.write_str("Lax"),
            SameSite::Strict => f.write_str("Strict"),
        }
    }
}

/// Attributes for the session cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "warden_session".to_owned(),
            path: "/".to_owned(),
            domain: None,
            secure: true,
            http_only: true,
        }
    }
}

/// Renders the `Set-Cookie` value carrying the session token.
///
/// The cookie expires together with the session. Cross-site sessions get
/// `SameSite=None` (which requires `Secure`); everything else is `Strict`.
pub fn session_cookie(config: &CookieConfig, session: &SessionRecord) -> String {
    let same_site = if session.cross_site {
        SameSite::None
    } else {
        SameSite::Strict
    };

    let mut cookie = format!(
        "{}={}; Expires={}; Path={}; SameSite={}",
        config.name,
        session.token.expose_secret(),
        session.expiry.format("%a, %d %b %Y %H:%M:%S GMT"),
        config.path,
        same_site,
    );
    append_common_attributes(&mut cookie, config, session.cross_site);
    cookie
}

/// Renders the `Set-Cookie` value that removes the session cookie.
pub fn removal_cookie(config: &CookieConfig) -> String {
    let mut cookie = format!(
        "{}=; Max-Age=0; Path={}; SameSite={}",
        config.name,
        config.path,
        SameSite::Strict,
    );
    append_common_attributes(&mut cookie, config, false);
    cookie
}

fn append_common_attributes(cookie: &mut String, config: &CookieConfig, cross_site: bool) {
    if let Some(domain) = &config.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if config.http_only {
        cookie.push_str("; HttpOnly");
    }
    // SameSite=None is rejected by browsers without Secure.
    if config.secure || cross_site {
        cookie.push_str("; Secure");
    }
}
