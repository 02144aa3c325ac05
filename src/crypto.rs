//! Session token generation and secret handling.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default number of random bytes drawn for a session token.
pub const DEFAULT_TOKEN_RANDOMNESS: usize = 40;

/// Default stored token length in characters.
pub const DEFAULT_TOKEN_LENGTH: usize = 50;

/// Generates an opaque URL-safe session token.
///
/// Draws `randomness` bytes from the thread RNG (reseeded from the OS),
/// encodes them with URL-safe base64 without padding, and truncates the
/// result to `length` characters. With the defaults that is 50 characters
/// out of the 54 that 40 bytes encode to; the truncated width is part of
/// the stored-column contract.
///
/// # Example
///
/// ```rust
/// use warden::crypto::generate_session_token;
///
/// let token = generate_session_token(40, 50);
/// assert_eq!(token.len(), 50);
/// ```
pub fn generate_session_token(randomness: usize, length: usize) -> String {
    let mut bytes = vec![0u8; randomness];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut token = URL_SAFE_NO_PAD.encode(bytes);
    token.truncate(length);
    token
}

/// Generates a token with the default entropy and length.
pub fn generate_session_token_default() -> String {
    generate_session_token(DEFAULT_TOKEN_RANDOMNESS, DEFAULT_TOKEN_LENGTH)
}

/// A wrapper for bearer tokens that prevents accidental logging.
///
/// `SecretString` implements `Debug` and `Display` to show `[REDACTED]`
/// instead of the actual content.
///
/// # Example
///
/// ```rust
/// use warden::SecretString;
///
/// let token = SecretString::new("opaque-session-token");
///
/// assert_eq!(format!("{:?}", token), "SecretString([REDACTED])");
/// assert_eq!(token.expose_secret(), "opaque-session-token");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new `SecretString`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the wrapped value.
    ///
    /// Use only at the boundary where the token leaves the crate, such as
    /// when setting a cookie or comparing against storage.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The real value is serialized so tokens can travel in responses.
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString(s))
    }
}
