//! Tenant key type.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TenancyError;

/// Maximum length of a tenant key or environment segment.
const MAX_SEGMENT_LEN: usize = 64;

/// A validated tenant key.
///
/// Keys identify a tenant in the [`TenantRegistry`](super::TenantRegistry)
/// and double as the tenant's routing prefix (`/{key}`), so they are limited
/// to a single URL-safe path segment.
///
/// # Examples
///
/// ```
/// use helios_tenancy::tenant::TenantKey;
///
/// let key = TenantKey::new("acme").unwrap();
/// assert_eq!(key.as_str(), "acme");
/// assert_eq!(key.mount_path(), "/acme");
///
/// assert!(TenantKey::new("acme.com").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantKey(String);

impl TenantKey {
    /// Creates a tenant key, validating its format.
    pub fn new(key: impl Into<String>) -> Result<Self, TenancyError> {
        let key = key.into();
        if is_valid_segment(&key) {
            Ok(Self(key))
        } else {
            Err(TenancyError::InvalidTenantKey { key })
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path prefix this tenant's chain is mounted under.
    pub fn mount_path(&self) -> String {
        format!("/{}", self.0)
    }
}

/// Returns true if `s` is usable as a single routing path segment.
///
/// Segments are alphanumeric with hyphens and underscores and have a
/// reasonable length.
pub fn is_valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_SEGMENT_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Debug for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantKey({})", self.0)
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantKey {
    type Err = TenancyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TenantKey {
    type Error = TenancyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantKey> for String {
    fn from(key: TenantKey) -> Self {
        key.0
    }
}

impl AsRef<str> for TenantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TenantKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
