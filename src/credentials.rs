//! Credentials handed to Claude Code through the environment.
//!
//! Values are opaque: they are never parsed or validated here, only checked
//! for presence and shown in redacted form.

use std::fmt;

/// OAuth bearer token, conventionally prefixed `sk-ant-oat01-`.
pub const OAUTH_TOKEN_VAR: &str = "CLAUDE_CODE_OAUTH_TOKEN";

/// Alternative session credential.
pub const SESSION_VAR: &str = "CLAUDE_CODE_SESSION";

/// Number of leading characters shown by [`preview`].
pub const PREVIEW_CHARS: usize = 20;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub oauth_token: Option<String>,
    pub session_token: Option<String>,
}

impl Credentials {
    /// Read both credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both credentials through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            oauth_token: read(OAUTH_TOKEN_VAR),
            session_token: read(SESSION_VAR),
        }
    }

    pub fn has_any(&self) -> bool {
        self.oauth_token.is_some() || self.session_token.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("oauth_token", &self.oauth_token.as_deref().map(preview))
            .field("session_token", &self.session_token.as_deref().map(preview))
            .finish()
    }
}

/// Redacted form of a secret: its first 20 characters followed by `...`.
pub fn preview(secret: &str) -> String {
    let mut shown: String = secret.chars().take(PREVIEW_CHARS).collect();
    shown.push_str("...");
    shown
}
