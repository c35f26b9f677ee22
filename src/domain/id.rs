//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Round number of an event within a season.
///
/// Always at least 1; construction goes through [`RoundId::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RoundId(u32);

impl RoundId {
    /// Create a round id, rejecting zero.
    pub fn try_new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidRound { value });
        }
        Ok(Self(value))
    }

    /// Get the round number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for RoundId {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<RoundId> for u32 {
    fn from(id: RoundId) -> Self {
        id.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Driver identifier - newtype for type safety.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriverId(String);

impl DriverId {
    /// Create a new `DriverId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the driver ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DriverId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for DriverId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_id_rejects_zero() {
        assert_eq!(
            RoundId::try_new(0),
            Err(DomainError::InvalidRound { value: 0 })
        );
        assert_eq!(RoundId::try_new(9).map(RoundId::get), Ok(9));
    }

    #[test]
    fn round_id_orders_numerically() {
        let nine = RoundId::try_new(9).unwrap();
        let ten = RoundId::try_new(10).unwrap();
        assert!(nine < ten);
    }

    #[test]
    fn round_id_deserialization_validates() {
        let ok: RoundId = serde_json::from_str("12").unwrap();
        assert_eq!(ok.get(), 12);
        assert!(serde_json::from_str::<RoundId>("0").is_err());
    }
}
