//! Domain error types.
//!
//! These errors represent violations of the time-series invariants. They
//! are distinct from API/IO errors.

use super::SeriesField;

/// Domain-level errors for building a [`StationTimeSeries`](super::StationTimeSeries).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A series does not have one sample per timestamp
    #[error("series {field} has {found} samples, expected {expected}")]
    LengthMismatch {
        field: SeriesField,
        expected: usize,
        found: usize,
    },

    /// A numeric series was supplied for a non-numeric field
    #[error("series {0} is not numeric")]
    NotNumeric(SeriesField),

    /// Timestamps are not in ascending order
    #[error("timestamps out of order at index {0}")]
    UnorderedTimes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::LengthMismatch {
            field: SeriesField::Temps,
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "series temps has 2 samples, expected 3");

        let err = DomainError::NotNumeric(SeriesField::WindDirs);
        assert_eq!(err.to_string(), "series wind_dirs is not numeric");

        let err = DomainError::UnorderedTimes(4);
        assert_eq!(err.to_string(), "timestamps out of order at index 4");
    }
}
