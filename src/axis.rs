//! The marker axis: an immutable sequence of positions and their allele arities.

use crate::error::{DagError, Result};

/// An immutable sequence of `L` positions, each with an allele cardinality `A_l >= 2`.
///
/// Implementers that need ancillary per-position metadata (physical positions,
/// marker identifiers) may wrap a [`MarkerAxis`] alongside their own data; the
/// core engine only ever consults the arity.
///
/// # Examples
/// ```
/// use hapdag_core::MarkerAxis;
///
/// let axis = MarkerAxis::new(vec![2, 3, 2]).expect("axis is valid");
/// assert_eq!(axis.len(), 3);
/// assert_eq!(axis.arity(1), 3);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerAxis {
    arities: Vec<u32>,
}

impl MarkerAxis {
    /// Builds a marker axis from per-position allele arities.
    ///
    /// # Errors
    /// Returns [`DagError::InvalidAxis`] when `arities` is empty or any entry
    /// is less than 2.
    pub fn new(arities: Vec<u32>) -> Result<Self> {
        if arities.is_empty() {
            return Err(DagError::InvalidAxis {
                reason: "marker axis must have at least one position".to_string(),
            });
        }
        if let Some((level, arity)) = arities.iter().enumerate().find(|(_, &a)| a < 2) {
            return Err(DagError::InvalidAxis {
                reason: format!("level {level} has arity {arity}, which must be at least 2"),
            });
        }
        Ok(Self { arities })
    }

    /// Returns the number of positions, `L`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arities.len()
    }

    /// Returns whether the axis has no positions. Always `false` for a
    /// successfully constructed axis; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arities.is_empty()
    }

    /// Returns the allele arity `A_l` at position `level`.
    ///
    /// # Panics
    /// Panics if `level >= self.len()`; callers within this crate only ever
    /// query levels known to be in range.
    #[must_use]
    pub fn arity(&self, level: usize) -> u32 {
        self.arities[level]
    }

    /// Returns the allele arity at `level`, or `None` if out of range.
    #[must_use]
    pub fn get_arity(&self, level: usize) -> Option<u32> {
        self.arities.get(level).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rejects_empty_axis() {
        let err = MarkerAxis::new(vec![]).unwrap_err();
        assert_eq!(err.code(), crate::error::DagErrorCode::InvalidAxis);
    }

    #[rstest]
    #[case::zero(vec![0, 2])]
    #[case::one(vec![2, 1])]
    fn rejects_invalid_arity(#[case] arities: Vec<u32>) {
        let err = MarkerAxis::new(arities).unwrap_err();
        assert_eq!(err.code(), crate::error::DagErrorCode::InvalidAxis);
    }

    #[test]
    fn accepts_valid_axis() {
        let axis = MarkerAxis::new(vec![2, 4, 3]).expect("axis must be valid");
        assert_eq!(axis.len(), 3);
        assert_eq!(axis.arity(0), 2);
        assert_eq!(axis.arity(1), 4);
        assert_eq!(axis.get_arity(5), None);
    }
}
