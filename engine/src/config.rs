use crate::error::{self, Result};
use snafu::OptionExt;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A secret value retrieved from the configuration facility. The value never appears in `Debug`
/// output or logs; callers that genuinely need the plaintext call [`Secret::reveal`].
#[derive(Clone, Eq, PartialEq)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// The key-value configuration facility the external engine exposes. A required key that is
/// absent is fatal and must fail before any node is declared, so a half-configured run never
/// reaches the engine.
pub trait ConfigSource {
    fn require(&self, key: &str) -> Result<String>;
    fn require_secret(&self, key: &str) -> Result<Secret>;
}

/// A config source backed by in-process maps. Production runs wrap the engine's own facility;
/// this one serves file-loaded stack configuration and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigSource {
    values: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_secret<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.secrets.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MemoryConfigSource {
    fn require(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .context(error::MissingConfigKeySnafu { key })
    }

    fn require_secret(&self, key: &str) -> Result<Secret> {
        self.secrets
            .get(key)
            .map(|value| Secret::new(value.clone()))
            .context(error::MissingSecretSnafu { key })
    }
}
