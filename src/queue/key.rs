//! # Reconciliation keys.
//!
//! A [`Key`] names one unit of work, usually `namespace/name` of a resource.
//! It is opaque to the engine: the queue dedups on it and the handler decodes it.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Opaque, cheaply clonable reconciliation key.
///
/// # Example
/// ```
/// use reconvisor::Key;
///
/// let key = Key::namespaced("cert-manager", "ingress-tls");
/// assert_eq!(key.as_str(), "cert-manager/ingress-tls");
/// assert_eq!(key.split(), (Some("cert-manager"), "ingress-tls"));
///
/// let cluster_scoped = Key::from("letsencrypt-prod");
/// assert_eq!(cluster_scoped.split(), (None, "letsencrypt-prod"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    /// Wraps an arbitrary string.
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Builds a `namespace/name` key. An empty namespace yields just `name`.
    pub fn namespaced(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self::new(name)
        } else {
            Self::new(format!("{namespace}/{name}"))
        }
    }

    /// Splits the key at the first `/` into `(namespace, name)`.
    pub fn split(&self) -> (Option<&str>, &str) {
        match self.0.split_once('/') {
            Some((ns, name)) => (Some(ns), name),
            None => (None, &self.0),
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
