//! Explicit credential sets.
//!
//! Resolution and invocation never read the process environment on their own;
//! the HTTP layer builds a [`Credentials`] value (usually with
//! [`Credentials::from_env`]) and passes it in.

use std::collections::HashMap;
use std::fmt;

/// Credential names the built-in catalog refers to.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

pub const KNOWN_KEYS: [&str; 3] = [GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY];

/// Key → secret mapping. A credential counts as present only when its value
/// is non-empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    inner: HashMap<String, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the known credential names from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_keys(KNOWN_KEYS)
    }

    /// Snapshot the given credential names from the process environment.
    pub fn from_env_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let inner = keys
            .into_iter()
            .filter_map(|k| {
                let k = k.as_ref();
                std::env::var(k).ok().map(|v| (k.to_string(), v))
            })
            .collect();
        Self { inner }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    /// The secret for `name`, or `None` if it is absent or empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of every credential that is present, sorted.
    pub fn configured_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .inner
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl<K, V> FromIterator<(K, V)> for Credentials
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        let mut keys: Vec<&String> = self.inner.keys().collect();
        keys.sort();
        for k in keys {
            let shown = if self.has(k) { "<set>" } else { "<empty>" };
            map.entry(k, &shown);
        }
        map.finish()
    }
}
