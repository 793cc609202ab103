//! Provider API keys.
//!
//! Keys are wrapped in [`ApiCredential`] as soon as they are read. The
//! wrapper prints as `[REDACTED]`, zeroes its buffer on drop, and hands out
//! the raw string only through [`ApiCredential::expose`], which adapters call
//! at the moment they set the auth header.
//!
//! ```ignore
//! use promptcheck_runtime::providers::{ApiCredential, CredentialSource};
//!
//! let key = ApiCredential::new(raw_key, CredentialSource::Programmatic, "DeepSeek API key");
//! builder.bearer_auth(key.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Origin of a credential, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from the environment (or a lookup standing in for it)
    Environment,
    /// Passed in by calling code
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Environment => "environment",
            CredentialSource::Programmatic => "programmatic",
        })
    }
}

/// An API key that never shows up in logs.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Read `env_var` through `lookup`. Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: &F, env_var: &str, name: &'static str) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(env_var)
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::new(v, CredentialSource::Environment, name))
    }

    /// The raw key. Use it inline when building a request; don't keep it.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Display name, e.g. "OpenAI API key".
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Clone for ApiCredential {
    fn clone(&self) -> Self {
        Self::new(self.expose(), self.source, self.name)
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED] ({}, {})", self.name, self.source)
    }
}
