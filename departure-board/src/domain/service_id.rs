//! Darwin service identifier.

use std::fmt;

/// Error returned when a service identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service ID: {reason}")]
pub struct InvalidServiceId {
    reason: &'static str,
}

/// An ephemeral Darwin service ID, such as `"2220854PADTON__"`.
///
/// IDs are only valid while the service is on a board, but they are stable
/// across repeated queries within that window, which makes them the
/// deduplication key when paging through next departures.
///
/// # Examples
///
/// ```
/// use departure_board::domain::ServiceId;
///
/// let id = ServiceId::new("2220854PADTON__").unwrap();
/// assert_eq!(id.as_str(), "2220854PADTON__");
///
/// assert!(ServiceId::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a service ID, rejecting blank input.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidServiceId> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(InvalidServiceId {
                reason: "service ID cannot be empty",
            });
        }
        Ok(ServiceId(s))
    }

    /// Returns the service ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceId({})", self.0)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rejects_blank() {
        assert!(ServiceId::new("").is_err());
        assert!(ServiceId::new(" \t").is_err());
    }

    #[test]
    fn usable_as_dedup_key() {
        let mut seen = HashSet::new();
        assert!(seen.insert(ServiceId::new("A1").unwrap()));
        assert!(seen.insert(ServiceId::new("B2").unwrap()));
        assert!(!seen.insert(ServiceId::new("A1").unwrap()));
    }

    #[test]
    fn display_and_debug() {
        let id = ServiceId::new("2220850PADTON__").unwrap();
        assert_eq!(id.to_string(), "2220850PADTON__");
        assert_eq!(format!("{id:?}"), "ServiceId(2220850PADTON__)");
    }
}
