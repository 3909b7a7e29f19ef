//! Result and Error types for the utils module

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, PartialEq)]
/// The error type for `dosekit_utils`
pub enum Error {
    /// An empty slice of floats
    SliceContainsNoValues,

    /// The slice contains NAN or INFINITY
    SliceContainsUndefinedValues,

    /// Edge search fell through, only reachable with unsorted edges
    UncapturedErrorCondition,

    /// Value searched for is outside of the first and last edge
    ValueOutsideOfBounds {
        value: f64,
        lower_bound: f64,
        upper_bound: f64,
    },

    /// Fewer values than needed, e.g. a single bin edge
    BelowMinimumSliceLength {
        length: usize,
        minimum_required: usize,
    },

    /// Bin edges must be strictly increasing
    EdgesNotAscending { index: usize },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::SliceContainsNoValues => write!(f, "no values to work with"),
            Self::SliceContainsUndefinedValues => write!(f, "values must all be finite"),
            Self::UncapturedErrorCondition => write!(f, "no bin found, edges may be unsorted"),
            Self::ValueOutsideOfBounds {
                value,
                lower_bound,
                upper_bound,
            } => write!(f, "{value} is outside of [{lower_bound}, {upper_bound}]"),
            Self::BelowMinimumSliceLength {
                length,
                minimum_required,
            } => write!(f, "found {length} values, need at least {minimum_required}"),
            Self::EdgesNotAscending { index } => {
                write!(f, "edges must be strictly increasing, edge {index} is not")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_messages() {
        let e = Error::EdgesNotAscending { index: 2 };
        assert_eq!(e.to_string(), "edges must be strictly increasing, edge 2 is not");

        let e = Error::BelowMinimumSliceLength {
            length: 1,
            minimum_required: 2,
        };
        assert_eq!(e.to_string(), "found 1 values, need at least 2");

        let e = Error::ValueOutsideOfBounds {
            value: 3.5,
            lower_bound: 0.0,
            upper_bound: 2.0,
        };
        assert_eq!(e.to_string(), "3.5 is outside of [0, 2]");
    }
}
