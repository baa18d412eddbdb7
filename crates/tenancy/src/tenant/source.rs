//! Tenant source identification.

use std::fmt;

/// Strategy that produced a request's tenant key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenantSource {
    /// Tenant key read from a request header.
    Header,
    /// Tenant key read from the `Host` subdomain.
    Host,
    /// Tenant key produced by an application-supplied parser.
    Custom,
    /// No key was produced; the configured default was used.
    Default,
}

impl TenantSource {
    /// Returns true if this source is the default fallback.
    pub fn is_default(&self) -> bool {
        matches!(self, TenantSource::Default)
    }
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantSource::Header => write!(f, "header"),
            TenantSource::Host => write!(f, "host"),
            TenantSource::Custom => write!(f, "custom"),
            TenantSource::Default => write!(f, "default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        assert_eq!(TenantSource::Header.to_string(), "header");
        assert_eq!(TenantSource::Host.to_string(), "host");
        assert_eq!(TenantSource::Custom.to_string(), "custom");
        assert_eq!(TenantSource::Default.to_string(), "default");
    }

    #[test]
    fn test_is_default() {
        assert!(!TenantSource::Header.is_default());
        assert!(!TenantSource::Custom.is_default());
        assert!(TenantSource::Default.is_default());
    }
}
