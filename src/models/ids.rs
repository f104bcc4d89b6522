//! Event identifier newtype
//!
//! Ids are positive integers handed out by the event store. Wrapping them keeps
//! an id from being confused with an occurrence count or a minute offset.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a stored event, unique within one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u32);

impl EventId {
    /// Wrap a raw id
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw integer value
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The id that follows this one, or `None` past `u32::MAX`
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EventId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl FromStr for EventId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the "#12" form the list view prints
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_parse() {
        let id = EventId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!("42".parse::<EventId>().unwrap(), id);
        assert_eq!("#42".parse::<EventId>().unwrap(), id);
        assert!("abc".parse::<EventId>().is_err());
        assert!("-1".parse::<EventId>().is_err());
    }

    #[test]
    fn test_id_ordering_and_next() {
        assert!(EventId::new(1) < EventId::new(2));
        assert_eq!(EventId::new(7).next(), Some(EventId::new(8)));
        assert_eq!(EventId::new(u32::MAX).next(), None);
    }
}
