//! Bearer token sourcing
//!
//! The client never manages sessions itself. Whatever signs the user in hands
//! it an [`AuthTokenProvider`], which is asked for a token before every
//! request. A missing token fails the request locally with
//! [`ClientError::AuthRequired`](crate::ClientError::AuthRequired).

use std::fmt;

/// Supplies the bearer token attached to each request
pub trait AuthTokenProvider: Send + Sync {
    /// Current token, or `None` if the user is not signed in
    fn bearer_token(&self) -> Option<String>;
}

/// Token fixed at construction time
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Provider that never has a token
    pub fn none() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticToken {
    fn from(token: Option<String>) -> Self {
        Self(token)
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.0.is_some() { "Some(<redacted>)" } else { "None" };
        f.debug_tuple("StaticToken").field(&shown).finish()
    }
}

impl AuthTokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        normalize(self.0.as_deref())
    }
}

/// Token read from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl AuthTokenProvider for EnvToken {
    fn bearer_token(&self) -> Option<String> {
        normalize(std::env::var(&self.var).ok().as_deref())
    }
}

/// Blank tokens count as absent.
fn normalize(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
