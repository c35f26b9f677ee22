//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors when an input would
//! break one of the domain invariants (round numbering, coordinate ranges,
//! prediction set permutations).
//!
//! # Examples
//!
//! ```
//! use racewatch::domain::error::DomainError;
//! use racewatch::domain::id::RoundId;
//!
//! assert!(matches!(RoundId::try_new(0), Err(DomainError::InvalidRound { value: 0 })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Round numbers start at 1.
    #[error("round number must be at least 1, got {value}")]
    InvalidRound {
        /// The rejected round number.
        value: u32,
    },

    /// The schedule must contain at least one event.
    #[error("schedule catalog is empty")]
    EmptyCatalog,

    /// Two schedule entries share a round number.
    #[error("round {round} appears more than once in the schedule")]
    DuplicateRound {
        /// The duplicated round number.
        round: u32,
    },

    /// Latitude or longitude outside the valid range.
    #[error("invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    /// A grid or prediction position outside `1..=len`.
    #[error("{field} {position} is outside 1..={len}")]
    PositionOutOfRange {
        /// Which position field was checked.
        field: &'static str,
        /// The rejected position.
        position: u32,
        /// Number of entries in the set.
        len: usize,
    },

    /// The same grid or prediction position used twice.
    #[error("{field} {position} appears more than once")]
    DuplicatePosition {
        /// Which position field was checked.
        field: &'static str,
        /// The duplicated position.
        position: u32,
    },

    /// A percentage outside `[0, 100]` or not finite.
    #[error("{field} must be within 0..=100, got {value}")]
    PercentOutOfRange {
        /// Which percentage field was checked.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A timestamp string that matches none of the accepted layouts.
    #[error("unrecognised timestamp '{value}'")]
    InvalidTimestamp {
        /// The rejected text.
        value: String,
    },
}
